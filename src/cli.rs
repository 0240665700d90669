use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about = "scholarz ratings backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Create or reset the ratings database schema
    Init,
    /// Load subject profiles or rating submissions from a CSV file
    Import {
        /// Path to the CSV file
        #[arg(short, long)]
        file: PathBuf,
        /// What the file contains
        #[arg(short, long, value_enum)]
        kind: ImportKind,
    },
    /// Submit a rating, replacing the rater's previous one if present
    Submit {
        /// Subject (SME) identifier
        #[arg(long)]
        subject: String,
        /// Rater (SDP) identifier
        #[arg(long)]
        rater: String,
        /// Display name of the rater
        #[arg(long)]
        rater_name: Option<String>,
        /// Score from 1 to 5
        #[arg(long)]
        score: i32,
        /// Optional review text
        #[arg(long)]
        comment: Option<String>,
    },
    /// Recompute denormalized aggregates from the stored ratings
    Recompute {
        /// Single subject to recompute; all subjects when omitted
        #[arg(long)]
        subject: Option<String>,
    },
    /// Show a subject profile with its recent reviews
    Show {
        /// Subject (SME) identifier
        #[arg(long)]
        subject: String,
    },
}

#[derive(ValueEnum, Debug, Clone, PartialEq)]
pub enum ImportKind {
    Subjects,
    Ratings,
}
