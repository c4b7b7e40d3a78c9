//! Transcript printer for one-shot CLI runs.

use owo_colors::OwoColorize;

use crate::transcript::{LogLine, Tag};

pub struct TranscriptPrinter {
    pub color: bool,
}

impl TranscriptPrinter {
    pub fn print(&self, lines: &[LogLine]) {
        for line in lines {
            let rendered = line.to_string();
            if !self.color {
                println!("{}", rendered);
                continue;
            }
            match line.tag {
                Tag::Output => println!("{}", rendered.green()),
                Tag::Error => println!("{}", rendered.red()),
                Tag::Warn => println!("{}", rendered.yellow()),
                Tag::Return => println!("{}", rendered.blue()),
                Tag::Info => println!("{}", rendered.cyan()),
            }
        }
    }
}
