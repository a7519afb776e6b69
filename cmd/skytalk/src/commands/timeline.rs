//! Prints timeline pages and post details without starting a voice session.

use chrono::Utc;
use clap::Args;
use skytalk_timeline::{render, FeedProvider};

use super::{get_config, open_timeline};
use crate::Cli;

#[derive(Args)]
pub struct TimelineCommand {
    /// Page number to summarize
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Show the detail of this post number instead
    #[arg(long)]
    post: Option<usize>,
}

impl TimelineCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let timeline = open_timeline(&cfg).await?;
        let now = Utc::now();

        match self.post {
            Some(number) => {
                let post = timeline.detail(number).await?;
                println!("{}", render::format_detail(&post, now));
            }
            None => {
                let posts = timeline.page(self.page).await?;
                if posts.is_empty() {
                    println!("No posts on page {}.", self.page);
                } else {
                    println!("{}", render::format_page(&posts, now));
                }
            }
        }
        Ok(())
    }
}
