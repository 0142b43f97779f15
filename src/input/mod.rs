//! Interactive collection of the four optional source lists.

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

use crate::flow::BANNER;
use crate::flow::state::SourceInputs;

const RULE: &str = "──────────────────────────────────────────────────────────────────────";

/// One prompt section shown to the operator.
struct Section {
    heading: &'static str,
    hints: &'static [&'static str],
    prompt: &'static str,
}

const YOUTUBE: Section = Section {
    heading: "📺 YOUTUBE VIDEOS/CHANNELS",
    hints: &[
        "Individual video URLs (e.g., https://youtube.com/watch?v=abc123)",
        "Channel URLs (e.g., https://youtube.com/@channelname)",
        "Multiple links separated by commas",
    ],
    prompt: "Enter YouTube links (or press Enter to skip): ",
};

const WEBPAGES: Section = Section {
    heading: "🌐 WEB PAGES/ARTICLES",
    hints: &[
        "Documentation URLs",
        "Blog posts or tutorials",
        "Multiple links separated by commas",
    ],
    prompt: "Enter web page URLs (or press Enter to skip): ",
};

const PAPERS: Section = Section {
    heading: "📄 RESEARCH PAPERS (arXiv)",
    hints: &[
        "arXiv URLs (e.g., https://arxiv.org/abs/2103.xxxxx)",
        "Paper titles or arXiv IDs",
        "Multiple entries separated by commas",
    ],
    prompt: "Enter research paper links/queries (or press Enter to skip): ",
};

const DOCUMENTS: Section = Section {
    heading: "📁 DOCUMENTS (PDF/Text/Markdown)",
    hints: &[
        "Local file paths to PDFs",
        "Text file paths (.txt)",
        "Markdown file paths (.md, .mdx)",
        "Multiple paths separated by commas",
    ],
    prompt: "Enter document paths (or press Enter to skip): ",
};

/// Reads answers from `reader` and writes prompts to `writer`.
pub struct InputCollector<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> InputCollector<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Asks for YouTube links, web pages, papers and documents, in that order.
    /// End of input answers every remaining prompt with an empty string.
    pub fn collect(&mut self) -> Result<SourceInputs> {
        self.welcome()?;

        let youtube_links = self.ask(&YOUTUBE)?;
        let webpage_links = self.ask(&WEBPAGES)?;
        let research_paper_links = self.ask(&PAPERS)?;
        let document_paths = self.ask(&DOCUMENTS)?;

        Ok(SourceInputs {
            youtube_links,
            webpage_links,
            research_paper_links,
            document_paths,
        })
    }

    fn welcome(&mut self) -> Result<()> {
        let w = &mut self.writer;
        writeln!(w, "\n{}", BANNER)?;
        writeln!(w, "🎯 GUIDE GENERATOR - INPUT COLLECTION")?;
        writeln!(w, "{}", BANNER)?;
        writeln!(
            w,
            "\nWelcome! Let's create a getting-started guide for your framework/tool."
        )?;
        writeln!(
            w,
            "\nℹ️  All source inputs are OPTIONAL. You can skip any by pressing Enter."
        )?;
        writeln!(w, "{}", BANNER)?;
        Ok(())
    }

    fn ask(&mut self, section: &Section) -> Result<String> {
        writeln!(self.writer, "\n{}", RULE)?;
        writeln!(self.writer, "\n{}", section.heading)?;
        writeln!(self.writer, "   You can provide:")?;
        for hint in section.hints {
            writeln!(self.writer, "   - {}", hint)?;
        }
        write!(self.writer, "\n   {}", section.prompt)?;
        self.writer.flush().context("failed to flush prompt")?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .context("failed to read answer from terminal")?;
        Ok(line.trim().to_string())
    }
}

/// Prompts on stdout and reads from stdin.
pub fn collect_from_terminal() -> Result<SourceInputs> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    InputCollector::new(stdin.lock(), stdout.lock()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(answers: &str) -> (SourceInputs, String) {
        let mut output = Vec::new();
        let inputs = InputCollector::new(Cursor::new(answers.as_bytes()), &mut output)
            .collect()
            .unwrap();
        (inputs, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_answers_are_read_in_order_and_trimmed() {
        let (inputs, _) = collect(
            "  https://youtube.com/@rustlang \nhttps://doc.rust-lang.org/book/\n2103.00020\n./notes.md\n",
        );
        assert_eq!(inputs.youtube_links, "https://youtube.com/@rustlang");
        assert_eq!(inputs.webpage_links, "https://doc.rust-lang.org/book/");
        assert_eq!(inputs.research_paper_links, "2103.00020");
        assert_eq!(inputs.document_paths, "./notes.md");
    }

    #[test]
    fn test_skipped_answers_are_empty() {
        let (inputs, _) = collect("\n\n\n./guide.pdf\n");
        assert!(inputs.youtube_links.is_empty());
        assert!(inputs.webpage_links.is_empty());
        assert!(inputs.research_paper_links.is_empty());
        assert_eq!(inputs.document_paths, "./guide.pdf");
    }

    #[test]
    fn test_end_of_input_yields_empty_record() {
        let (inputs, _) = collect("https://example.com/doc");
        assert_eq!(inputs.webpage_links, "");
        assert_eq!(inputs.youtube_links, "https://example.com/doc");
        assert!(inputs.research_paper_links.is_empty());

        let (inputs, _) = collect("");
        assert_eq!(inputs, SourceInputs::default());
    }

    #[test]
    fn test_prompts_are_written_in_order() {
        let (_, output) = collect("");
        let positions: Vec<usize> = [
            "YOUTUBE VIDEOS/CHANNELS",
            "WEB PAGES/ARTICLES",
            "RESEARCH PAPERS (arXiv)",
            "DOCUMENTS (PDF/Text/Markdown)",
        ]
        .iter()
        .map(|heading| output.find(heading).unwrap())
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(output.contains("All source inputs are OPTIONAL"));
        assert!(output.contains(&format!("{}\n", BANNER)));
    }
}
