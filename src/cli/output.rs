//! CLI output formatting utilities.

use crate::agent::{RenderContent, RenderItem, RenderRole};
use crate::metadata::MovieRecord;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print an assistant answer.
    pub fn assistant(text: &str) {
        println!("\n{} {}\n", style("Reelchat:").cyan().bold(), text);
    }

    /// Print a movie card.
    pub fn movie_card(movie: &MovieRecord, image_base_url: &str) {
        let year = movie.year().map(|y| format!(" ({})", y)).unwrap_or_default();
        println!(
            "\n  {} {}{}  {}",
            style("*").cyan(),
            style(&movie.title).bold(),
            year,
            style(format!("{:.1}/10", movie.rating)).yellow()
        );
        if !movie.overview.is_empty() {
            println!("    {}", content_preview(&movie.overview, 200));
        }
        if !movie.cast.is_empty() {
            println!("    {} {}", style("Cast:").dim(), movie.cast.join(", "));
        }
        if let Some(director) = &movie.director {
            println!("    {} {}", style("Director:").dim(), director);
        }
        if let Some(url) = movie.poster_url(image_base_url) {
            println!("    {}", style(url).dim());
        }
    }

    /// Print the tool items of a turn: a headline and a card per movie.
    pub fn tool_items(items: &[RenderItem], image_base_url: &str) {
        for item in items.iter().filter(|i| i.role == RenderRole::Tool) {
            let tool = item.tool.as_deref().unwrap_or_default();
            match &item.content {
                RenderContent::Movies(movies) if movies.is_empty() => {
                    Output::info(&format!("{}: no movies found", tool));
                }
                RenderContent::Movies(movies) => {
                    println!("\n{}", style(tool_headline(tool)).bold());
                    for movie in movies {
                        Output::movie_card(movie, image_base_url);
                    }
                }
                RenderContent::Text(message) => {
                    Output::warning(&format!("{}: {}", tool, message));
                }
            }
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Heading shown above the results of a tool.
pub fn tool_headline(tool: &str) -> &'static str {
    match tool {
        "search_by_title" => "Here's what I found:",
        "search_by_genre" => "Of course! Here are some recommendations by genre:",
        "find_similar" => "Got it! Here are movies similar to your request:",
        "get_trending" => "Here are the trending movies right now:",
        "get_top_rated" => "Here are top rated movies:",
        "search_by_person" => "Here are movies featuring that person:",
        _ => "Of course! Here are some recommendations I found for you:",
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_headline() {
        assert_eq!(tool_headline("get_trending"), "Here are the trending movies right now:");
        assert!(tool_headline("unknown").contains("recommendations"));
    }

    #[test]
    fn test_content_preview_is_char_safe() {
        assert_eq!(content_preview("short", 10), "short");
        assert_eq!(content_preview("Amélie Poulain", 4), "Amél...");
    }
}
