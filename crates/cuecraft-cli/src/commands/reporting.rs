use anyhow::{Context, Result};
use colored::Colorize;
use cuecraft_spec::SoundMoment;
use serde::Serialize;

/// Prints `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

/// One line per moment: frame, kind, source, confidence, context.
pub(crate) fn print_moments(moments: &[SoundMoment]) {
    for moment in moments {
        println!(
            "  {:>5}  {:<18} {:<10} {:.2}  {}",
            moment.frame().to_string().cyan(),
            moment.kind().as_str(),
            moment.source().as_str().dimmed(),
            moment.confidence(),
            moment.context().dimmed()
        );
    }
}
