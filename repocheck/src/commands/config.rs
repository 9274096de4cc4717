//! `repocheck config show`.

use colored::Colorize;
use repocheck_common::LoadedConfig;
use repocheck_common::config::ConfigSource;

pub fn show(loaded: &LoadedConfig) {
    match &loaded.path {
        Some(path) => println!("{} {}", "config file:".bold(), path.display()),
        None => println!("{} {}", "config file:".bold(), "none (built-in defaults)".dimmed()),
    }
    println!();
    for line in render_entries(loaded) {
        println!("{line}");
    }
}

fn render_entries(loaded: &LoadedConfig) -> Vec<String> {
    let entries = loaded.entries();
    let width = entries.iter().map(|(key, _, _)| key.len()).max().unwrap_or(0);
    entries
        .into_iter()
        .map(|(key, value, source)| {
            let source = match source {
                ConfigSource::Default => source.to_string().dimmed(),
                ConfigSource::File => source.to_string().cyan(),
                ConfigSource::Environment => source.to_string().yellow(),
            };
            format!("{key:<width$}  {value}  ({source})")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use repocheck_common::RepocheckConfig;
    use std::io::Write;

    #[test]
    fn test_render_entries_marks_file_values() {
        colored::control::set_override(false);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[daemon]\nlisten = \"0.0.0.0:9000\"\n").unwrap();
        let loaded = RepocheckConfig::load_file(file.path()).unwrap();

        let lines = render_entries(&loaded);
        let listen = lines.iter().find(|l| l.starts_with("daemon.listen")).unwrap();
        assert!(listen.ends_with("0.0.0.0:9000  (file)"), "{listen}");
        let namespace = lines.iter().find(|l| l.starts_with("policy.namespace")).unwrap();
        assert!(namespace.ends_with("ioBroker  (default)"), "{namespace}");
    }
}
