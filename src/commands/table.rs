use crate::cli::TableArgs;
use crate::error::Result;
use crate::services::{load_listing, render_table, TableQuery};
use crate::utils::prompt_line;
use std::path::PathBuf;

/// Raw answers, in prompt order
struct TableRequest {
    file: PathBuf,
    filter: String,
    sort: String,
    reverse: String,
    range: String,
    columns: String,
}

pub fn run(args: TableArgs) {
    match show_table(args) {
        Ok(table) => println!("{}", table),
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

fn show_table(args: TableArgs) -> Result<String> {
    let request = match args.file {
        Some(file) => TableRequest {
            file,
            filter: args.filter.unwrap_or_default(),
            sort: args.sort.unwrap_or_default(),
            reverse: if args.reverse { "Yes".to_string() } else { String::new() },
            range: args.range.unwrap_or_default(),
            columns: args.columns.unwrap_or_default(),
        },
        None => prompt_request()?,
    };

    let query = TableQuery::parse(
        &request.filter,
        &request.sort,
        &request.reverse,
        &request.range,
        &request.columns,
    )?;
    let vacancies = load_listing(&request.file)?;
    render_table(vacancies, &query)
}

fn prompt_request() -> Result<TableRequest> {
    Ok(TableRequest {
        file: PathBuf::from(prompt_line("Enter file name")?),
        filter: prompt_line("Enter filter parameter")?,
        sort: prompt_line("Enter sort parameter")?,
        reverse: prompt_line("Reverse sort order (Yes / No)")?,
        range: prompt_line("Enter output range")?,
        columns: prompt_line("Enter required columns")?,
    })
}
