use anyhow::{Result, bail};
use bossa::app;
use bossa::config;
use bossa::model::Theme;
use std::env;

const HELP: &str = "\
bossa - leitor de música local

USAGE:
    bossa [OPTIONS]

OPTIONS:
    --theme <dark|black|ocean|sunset>   Start with the given theme
    --insight <host:port>               Address of the track insight service
    -h, --help                          Print this help
";

fn main() -> Result<()> {
    let mut settings = config::load_settings()?;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print!("{HELP}");
                return Ok(());
            }
            "--theme" => {
                let Some(value) = args.next() else {
                    bail!("--theme requires a value");
                };
                match Theme::parse(&value) {
                    Some(theme) => settings.theme = theme,
                    None => bail!("unknown theme: {value}"),
                }
            }
            "--insight" => {
                let Some(value) = args.next() else {
                    bail!("--insight requires a host:port value");
                };
                settings.insight_addr = Some(value);
            }
            other => bail!("unknown argument: {other} (try --help)"),
        }
    }

    app::run(settings)
}
