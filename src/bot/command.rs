use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption};

use crate::error::{Result, SubfetchError};
use crate::reddit::{pick_random, PageKind};

pub const SUBREDDIT_OPTION: &str = "subreddit";
pub const SORT_OPTION: &str = "sort";

/// Build the slash command definition
pub fn register(name: &str) -> CreateCommand {
    let mut sort = CreateCommandOption::new(
        CommandOptionType::String,
        SORT_OPTION,
        "pick from this listing instead of reddit's random post",
    )
    .required(false);
    for page in PageKind::ALL {
        sort = sort.add_string_choice(page.as_str(), page.as_str());
    }

    CreateCommand::new(name)
        .description("Get a free reddit post!")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                SUBREDDIT_OPTION,
                "get a random post from this subreddit",
            )
            .required(false),
        )
        .add_option(sort)
}

/// What a user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub subreddit: String,
    pub page: Option<PageKind>,
}

impl CommandRequest {
    /// Build a request from string options; without a subreddit one of the
    /// defaults is picked at random
    pub fn from_options<'a, I>(options: I, defaults: &[String]) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut subreddit = None;
        let mut page = None;

        for (name, value) in options {
            match name {
                SUBREDDIT_OPTION if !value.trim().is_empty() => subreddit = Some(value.trim().to_string()),
                SORT_OPTION => page = Some(value.parse::<PageKind>()?),
                _ => {}
            }
        }

        let subreddit = match subreddit {
            Some(subreddit) => subreddit,
            None => pick_random(defaults.to_vec()).ok_or_else(|| {
                SubfetchError::Config("no subreddit given and no defaults configured".to_string())
            })?,
        };

        Ok(Self { subreddit, page })
    }
}
