//! Languages command - lists what the selector can be compiled for.

use std::io::Write;

use sediment_core::SourceLanguage;

use crate::ui::colors;

/// Executes the `sediment languages` command.
pub fn run() -> super::Result {
    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    write(&mut writer)
}

fn write(writer: &mut dyn Write) -> super::Result {
    let width = SourceLanguage::ALL.iter().map(|l| l.name().len()).max().unwrap_or(0);

    for language in SourceLanguage::ALL {
        let extensions: Vec<String> = language.extensions().iter().map(|ext| format!(".{ext}")).collect();
        writeln!(
            writer,
            "{}  {}",
            colors::accent().apply_to(format!("{:<width$}", language.name())),
            colors::muted().apply_to(extensions.join(" ")),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_language_once() {
        console::set_colors_enabled(false);
        let mut buf = Vec::new();
        write(&mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();

        assert_eq!(out.lines().count(), SourceLanguage::ALL.len());
        assert!(out.lines().any(|l| l.starts_with("javascript") && l.contains(".js")));
        assert!(out.lines().any(|l| l.starts_with("rust") && l.contains(".rs")));
    }
}
