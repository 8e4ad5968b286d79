//! CLI commands for Lexicard.
//!
//! This module provides CLI commands for Lexicard, organized into:
//! - **Study commands**: cards, practice, speak
//! - **Progress commands**: stats, reset
//! - **Data commands**: export/import (transfer)
//! - **Utility commands**: init, config

// Study commands
pub mod cards;
pub mod practice;
pub mod speak;

// Progress commands
pub mod reset;
pub mod stats;

// Data commands
pub mod transfer;

// Utility commands
pub mod config_cmd;
pub mod init;

pub use cards::CardsCommand;
pub use config_cmd::ConfigCommand;
pub use init::InitCommand;
pub use practice::PracticeCommand;
pub use reset::ResetCommand;
pub use speak::SpeakCommand;
pub use stats::StatsCommand;
pub use transfer::TransferCommand;
