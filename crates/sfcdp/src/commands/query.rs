//! `sfcdp query`: run SQL and print each page as it arrives.

use std::pin::pin;
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};

use sfcdp_core::{QUERY_PAGE_SIZE, QueryResult, Session, SessionConfig};

use crate::cli::{GlobalOpts, OutputFormat, QueryArgs};
use crate::error::CliError;
use crate::messages::{Messages, fill};
use crate::output;

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn fetching(messages: &Messages, page: usize, offset: u64) -> String {
    fill(
        &messages.query.fetching,
        &[("page", &(page + 1)), ("offset", &offset)],
    )
}

pub async fn handle(
    config: &SessionConfig,
    args: QueryArgs,
    global: &GlobalOpts,
    messages: &Messages,
) -> Result<(), CliError> {
    let session = Session::connect(config).await?;
    let format = global.format();
    let progress = spinner(global.quiet);
    progress.set_message(fetching(messages, 0, 0));

    // Structured formats need the whole result to emit one document.
    if matches!(
        format,
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml
    ) {
        let result = QueryResult::collect(session.run_query(args.query)).await;
        progress.finish_and_clear();
        let result = result?;
        let out = output::render_single(&format, &result, |_| String::new(), |_| String::new())?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let mut pages = pin!(session.run_query(args.query));
    let mut total_rows = 0_usize;
    let mut page_count = 0_usize;

    while let Some(page) = pages.next().await {
        // Pages already printed stay printed; the error ends the run.
        let page = match page {
            Ok(page) => page,
            Err(err) => {
                progress.finish_and_clear();
                return Err(err.into());
            }
        };
        total_rows += page.rows.len();
        page_count += 1;

        if !page.done {
            progress.set_message(fetching(
                messages,
                page.index + 1,
                page.offset + QUERY_PAGE_SIZE,
            ));
        }
        if page.index == 0 || !page.rows.is_empty() {
            let out = output::render_rows(&format, &page.columns, &page.rows, page.index == 0)?;
            progress.suspend(|| output::print_output(&out, global.quiet));
        }
    }
    progress.finish_and_clear();

    let status = if total_rows == 0 {
        messages.query.empty.clone()
    } else {
        fill(
            &messages.query.summary,
            &[("rows", &total_rows), ("pages", &page_count)],
        )
    };
    output::print_status(&status, global.quiet);
    Ok(())
}
