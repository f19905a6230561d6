use clap::{Arg, Command, ArgAction};

pub const DEFAULT_CONFIG_PATH: &str = "shinobi-view.yaml";
pub const PASSWORD_ENV_VAR: &str = "SHINOBI_PASSWORD";

pub fn build_cli() -> Command {
    Command::new("shinobi-view")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live snapshot viewer for Shinobi NVR monitors. Runs the viewer window when no subcommand is given.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom configuration file")
                .default_value(DEFAULT_CONFIG_PATH)
                .action(ArgAction::Set)
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("fullscreen")
                .short('f')
                .long("fullscreen")
                .help("Start the viewer in fullscreen")
                .action(ArgAction::SetTrue)
        )
        .subcommand(
            Command::new("list-monitors")
                .about("Lists every monitor the configured keys can see")
        )
        .subcommand(
            Command::new("login")
                .about(format!("Logs in with e-mail and password (read from ${}) and stores the API and group keys", PASSWORD_ENV_VAR))
                .arg(Arg::new("server").long("server").value_name("URL").help("Server URL (default: the configured one)").action(ArgAction::Set))
                .arg(Arg::new("email").long("email").value_name("EMAIL").required(true).help("Account e-mail").action(ArgAction::Set))
        )
        .subcommand(
            Command::new("snapshot")
                .about("Saves one snapshot from every enabled monitor")
                .arg(Arg::new("monitors").long("monitors").value_name("MONITOR_IDS").help("Comma-separated list of monitor IDs (default: all enabled)").action(ArgAction::Set))
                .arg(Arg::new("output").short('o').long("output").value_name("DIR").help("Output directory for images").default_value("snapshots").action(ArgAction::Set))
        )
        .subcommand(
            Command::new("test")
                .about("Checks server connectivity and every enabled monitor")
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn parses_snapshot_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["shinobi-view", "-d", "snapshot", "--monitors", "a,b"])
            .unwrap();
        assert!(matches.get_flag("debug"));
        assert_eq!(matches.get_one::<String>("config").unwrap(), DEFAULT_CONFIG_PATH);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "snapshot");
        assert_eq!(sub.get_one::<String>("output").unwrap(), "snapshots");
    }
}
