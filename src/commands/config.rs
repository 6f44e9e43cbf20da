// ABOUTME: Config command implementation.
// ABOUTME: Shows, locates, or deletes the saved preference file.

use crate::cli::{ConfigAction, GlobalArgs};
use craftpod::config::ConfigStore;
use craftpod::error::Result;
use craftpod::output::{Output, OutputMode};

pub fn config(args: &GlobalArgs, action: ConfigAction, output: &Output) -> Result<()> {
    let store = ConfigStore::locate(args.config.as_deref())?;

    match action {
        ConfigAction::Show => {
            let preferences = store.load()?;
            if output.mode() == OutputMode::Json {
                output.json("preferences", &preferences);
            } else {
                if !store.exists() {
                    output.progress(&format!(
                        "# no preference file at {}; showing defaults",
                        store.path().display()
                    ));
                }
                print!("{}", preferences.to_yaml()?);
            }
        }
        ConfigAction::Path => {
            if output.mode() == OutputMode::Json {
                output.json("path", &store.path());
            } else {
                println!("{}", store.path().display());
            }
        }
        ConfigAction::Reset => {
            store.reset()?;
            output.success(&format!("Removed {}", store.path().display()));
        }
    }
    Ok(())
}
