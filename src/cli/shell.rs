use std::sync::Arc;
use std::thread;
use std::time::Duration;

use colored::Colorize;
use dialoguer::Input;

use crate::cli::{build_controller, print_result};
use crate::controller::RefreshController;
use crate::error::{Error, Result};
use crate::fmt::captured_at;

fn report_refresh(controller: &RefreshController) {
    match controller.refresh() {
        Ok(dataset) => {
            println!(
                "{} record(s) loaded at {}",
                dataset.len().to_string().green().bold(),
                captured_at(Some(dataset.captured_at))
            );
            if dataset.is_empty() {
                println!("{}", "The export has no rows yet.".yellow());
            }
            if let Some(result) = controller.last_result() {
                print_result(&result, false);
            }
        }
        Err(Error::RefreshInProgress) => {
            println!("{}", "A refresh is already running, try again shortly.".yellow());
        }
        Err(e) => {
            println!("{}", e.to_string().red());
            if controller.current().is_some() {
                println!("Still searching data from {}.", captured_at(controller.captured_at()));
            }
        }
    }
}

fn print_status(controller: &RefreshController) {
    let status = controller.status();
    println!("  Source:  {}", status.source);
    println!("  State:   {}", status.state);
    if let Some(err) = &status.last_error {
        println!("  Error:   {}", err.red());
    }
    println!("  Loaded:  {}", captured_at(status.captured_at));
    if let Some(count) = status.record_count {
        println!("  Records: {count}");
    }
    println!("  Term:    {}", status.active_term.as_deref().unwrap_or("(none)"));
}

fn spawn_refresher(controller: Arc<RefreshController>, secs: u64) {
    thread::spawn(move || loop {
        thread::sleep(Duration::from_secs(secs));
        match controller.refresh() {
            Ok(dataset) => {
                log::info!("scheduled refresh loaded {} record(s)", dataset.len());
                if let Some(result) = controller.last_result() {
                    println!();
                    println!("{}", "Data refreshed.".cyan());
                    print_result(&result, false);
                }
            }
            Err(Error::RefreshInProgress) => {}
            Err(e) => log::warn!("scheduled refresh failed: {e}"),
        }
    });
}

pub fn run(source: Option<&str>, every: Option<u64>) -> Result<()> {
    let controller = Arc::new(build_controller(source)?);
    println!("Loading {}", controller.status().source);
    report_refresh(&controller);

    if let Some(secs) = every.filter(|s| *s > 0) {
        spawn_refresher(Arc::clone(&controller), secs);
    }

    loop {
        let input: String = Input::new()
            .with_prompt("E-mail (:r refresh, :s status, :c clear, :q quit)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Other(e.to_string()))?;

        match input.trim() {
            ":q" | ":quit" => break,
            ":r" => report_refresh(&controller),
            ":s" => print_status(&controller),
            ":c" => {
                controller.clear_query();
                println!("Search cleared.");
            }
            "" => continue,
            term => match controller.search(term) {
                Ok(result) => print_result(&result, false),
                Err(e) => println!("{}", e.to_string().red()),
            },
        }
    }
    Ok(())
}
