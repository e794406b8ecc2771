use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TOOLSDIR_GENERATOR") {
            let command: Vec<String> = v.split_whitespace().map(String::from).collect();
            if command.is_empty() {
                tracing::warn!("ignoring empty TOOLSDIR_GENERATOR value");
            } else {
                self.generator.command = command;
            }
        }
        if let Ok(v) = std::env::var("TOOLSDIR_BASH") {
            self.interpreters.bash = v;
        }
        if let Ok(v) = std::env::var("TOOLSDIR_CMD") {
            self.interpreters.batch = v;
        }
        if let Ok(v) = std::env::var("TOOLSDIR_POWERSHELL") {
            self.interpreters.powershell = v;
        }
        if let Ok(v) = std::env::var("TOOLSDIR_TEMP_PREFIX") {
            self.activation.temp_prefix = v;
        }
        if let Ok(v) = std::env::var("TOOLSDIR_COLOR") {
            if let Ok(color) = v.parse::<bool>() {
                self.activation.color = color;
            } else {
                tracing::warn!("ignoring invalid TOOLSDIR_COLOR value: {v}");
            }
        }
        // https://no-color.org: any non-empty value disables color
        if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            self.activation.color = false;
        }
    }
}
