mod command;

use std::sync::Arc;

use roster_app::{RosterConfig, UserStore, UsersView};
use roster_source::{SimulatedSource, UserSource};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use command::{Command, HELP};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = RosterConfig::from_env()?;

    roster_app::tracing::init_tracing(&config.env);
    let metrics_handle = roster_app::metrics::init_metrics()?;

    let source = SimulatedSource::new(config.source_config())?;
    let store = Arc::new(UserStore::with_page_size(
        Arc::new(source) as Arc<dyn UserSource>,
        config.page_size,
    ));

    let mut view = UsersView::new(Arc::clone(&store), config.refresh_interval());
    view.mount();
    tracing::info!(
        page_size = config.page_size,
        refresh_interval_secs = config.refresh_interval_secs,
        "Roster started"
    );

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Metrics) => println!("{}", metrics_handle.render()),
                    Ok(command) => {
                        if let Err(e) = execute(&mut view, command) {
                            println!("{e}");
                        }
                        print!("{}", view.render());
                    }
                    Err(e) => println!("{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    view.unmount();
    tracing::info!("Roster stopped");

    Ok(())
}

/// Apply one command to the view.
///
/// Calls to the source run on their own task so the prompt keeps reading input
/// meanwhile; their handle is returned.
fn execute(
    view: &mut UsersView,
    command: Command,
) -> Result<Option<JoinHandle<()>>, roster_app::RosterError> {
    match command {
        Command::Next => {
            view.next_page();
        }
        Command::Prev => {
            view.previous_page();
        }
        Command::Page(page) => {
            view.go_to_page(page);
        }
        Command::Search(query) => view.search(query),
        Command::Edit(id) => view.start_edit(id)?,
        Command::Input(id, value) => view.set_edit_input(id, value)?,
        Command::Save(id) => {
            view.save_edit(id)?;
        }
        Command::Cancel(id) => {
            view.cancel_edit(id);
        }
        Command::Reload => {
            let store = Arc::clone(view.store());
            return Ok(Some(tokio::spawn(async move { store.fetch_users().await })));
        }
        Command::Refresh => {
            let store = Arc::clone(view.store());
            return Ok(Some(tokio::spawn(async move {
                store.refresh_user_scores().await;
            })));
        }
        Command::Show | Command::Metrics | Command::Help | Command::Quit => {}
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use roster_source::SourceConfig;

    use super::*;

    fn slow_view() -> UsersView {
        let source = SimulatedSource::new(SourceConfig {
            min_delay_ms: 2000,
            max_delay_ms: 2000,
            users_amount: 30,
            failure_rate: 0.0,
            seed: Some(7),
            ..SourceConfig::default()
        })
        .unwrap();
        let store = UserStore::new(Arc::new(source) as Arc<dyn UserSource>);
        UsersView::new(Arc::new(store), Duration::from_secs(30))
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_runs_in_background() {
        let mut view = slow_view();

        let handle = execute(&mut view, Command::Reload).unwrap().unwrap();
        tokio::task::yield_now().await;

        // The command returned while the source is still sleeping
        assert!(view.store().is_loading());
        assert_eq!(view.store().user_count(), 0);

        handle.await.unwrap();
        assert!(!view.store().is_loading());
        assert_eq!(view.store().user_count(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_runs_in_background() {
        let mut view = slow_view();
        execute(&mut view, Command::Reload).unwrap().unwrap().await.unwrap();
        let start = tokio::time::Instant::now();

        let handle = execute(&mut view, Command::Refresh).unwrap().unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);

        handle.await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(2000));
        assert_eq!(view.store().last_updated_user_ids().len(), 1);
    }

    #[test]
    fn test_local_commands_spawn_nothing() {
        let mut view = slow_view();

        assert!(execute(&mut view, Command::Next).unwrap().is_none());
        assert!(execute(&mut view, Command::Show).unwrap().is_none());
        assert!(execute(&mut view, Command::Save(1)).is_err());
    }
}
