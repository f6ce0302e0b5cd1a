//! Terminal output helpers.
//!
//! Results go to stdout; status lines and spinners go to stderr so output can
//! be piped.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::sync::LazyLock;
use std::time::Duration;

pub mod rgb {
    pub const FORGE_ORANGE: (u8, u8, u8) = (255, 140, 66);
    pub const STEEL_BLUE: (u8, u8, u8) = (120, 170, 230);
    pub const DIM_WHITE: (u8, u8, u8) = (180, 180, 190);
}

static QUIET_MODE: LazyLock<Mutex<bool>> = LazyLock::new(|| Mutex::new(false));

/// Enable or disable quiet mode
pub fn set_quiet_mode(enabled: bool) {
    *QUIET_MODE.lock() = enabled;
}

pub fn is_quiet_mode() -> bool {
    *QUIET_MODE.lock()
}

pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.yellow.bold} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_info(message: &str) {
    if !is_quiet_mode() {
        eprintln!("{}", message.cyan().bold());
    }
}

pub fn print_warning(message: &str) {
    if !is_quiet_mode() {
        eprintln!("{}", message.yellow().bold());
    }
}

pub fn print_error(message: &str) {
    // Errors print even in quiet mode
    eprintln!("{}", message.red().bold());
}

pub fn print_success(message: &str) {
    if !is_quiet_mode() {
        eprintln!("{}", message.green().bold());
    }
}

pub fn print_version(version: &str) {
    let (r, g, b) = rgb::FORGE_ORANGE;
    println!(
        "{} {} {}",
        "⚒ orm-forge".truecolor(r, g, b).bold(),
        "version".cyan(),
        version.green()
    );
}

/// A `label: value` line with a dimmed label
pub fn print_field(label: &str, value: &str) {
    let (r, g, b) = rgb::DIM_WHITE;
    let (vr, vg, vb) = rgb::STEEL_BLUE;
    println!(
        "  {} {}",
        format!("{label}:").truecolor(r, g, b),
        value.truecolor(vr, vg, vb)
    );
}

/// Mask all but the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "(not set)".to_string();
    }
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}
