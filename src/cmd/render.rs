use chrono::{DateTime, Utc};

use crate::domain::filter::RowSelection;
use crate::domain::ticket::Ticket;
use crate::workflow::listing::{ProgressBoard, TicketListing};
use crate::workflow::summary::CategorySummary;

const DATE_FORMAT: &str = "%a, %d %b %y, %H:%M";
const MAX_CELL_WIDTH: usize = 40;

pub fn format_date(value: &DateTime<Utc>) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub fn count_line(count: usize) -> String {
    if count == 0 {
        "No Tickets to display".to_string()
    } else {
        format!("Count: {count}")
    }
}

pub fn listing(listing: &TicketListing, selection: &RowSelection) -> String {
    let visible = listing.visible();
    let mut out = format!("{}\n", listing.category.label());
    if let Some(filter) = listing.filter() {
        out.push_str(&format!(
            "Filtered to {} ({} of {})\n",
            filter.date,
            visible.len(),
            listing.total()
        ));
    }
    out.push_str(&count_line(visible.len()));
    out.push('\n');

    let header = ["ID", "Name", "Department", "Date", "Description", "Type", "Status"];
    let rows = visible
        .iter()
        .map(|ticket| {
            (
                selection.is_selected(ticket.id),
                vec![
                    ticket.id.to_string(),
                    ticket.name.clone(),
                    ticket.department.clone(),
                    format_date(&ticket.date),
                    ticket.description.clone(),
                    ticket.request_type.clone(),
                    ticket.status.to_string(),
                ],
            )
        })
        .collect::<Vec<_>>();
    out.push_str(&table(&header, &rows));
    out
}

pub fn progress(board: &ProgressBoard, selection: &RowSelection) -> String {
    let mut out = format!("{} in progress\n", board.category.label());
    out.push_str(&count_line(board.tickets.len()));
    out.push('\n');

    let mut header = vec![
        "ID",
        "Name",
        "Department",
        "Date of Application",
        "Date Accepted",
        "Description",
        "Type",
        "Status",
        "IT Officer",
    ];
    let actions = board
        .actions
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join("/");
    if !board.actions.is_empty() {
        header.push("Actions");
    }

    let rows = board
        .tickets
        .iter()
        .map(|ticket| {
            let mut cells = progress_cells(ticket);
            if !board.actions.is_empty() {
                cells.push(actions.clone());
            }
            (selection.is_selected(ticket.id), cells)
        })
        .collect::<Vec<_>>();
    out.push_str(&table(&header, &rows));
    out
}

fn progress_cells(ticket: &Ticket) -> Vec<String> {
    vec![
        ticket.id.to_string(),
        ticket.name.clone(),
        ticket.department.clone(),
        format_date(&ticket.date),
        ticket
            .action_date
            .as_ref()
            .map(format_date)
            .unwrap_or_default(),
        ticket.description.clone(),
        ticket.request_type.clone(),
        ticket.status.to_string(),
        ticket.it_officer.clone().unwrap_or_default(),
    ]
}

pub fn summary(summaries: &[CategorySummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        out.push_str(&format!("{}: {}\n", summary.category.label(), summary.total));
        for (status, count) in &summary.by_status {
            out.push_str(&format!("  {status}: {count}\n"));
        }
    }
    out
}

fn table(header: &[&str], rows: &[(bool, Vec<String>)]) -> String {
    let mut widths = header.iter().map(|h| h.len()).collect::<Vec<_>>();
    let rows = rows
        .iter()
        .map(|(selected, cells)| (*selected, cells.iter().map(|c| clip(c)).collect::<Vec<_>>()))
        .collect::<Vec<_>>();
    for (_, cells) in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&line("  ", header.iter().copied(), &widths));
    for (selected, cells) in &rows {
        let marker = if *selected { "> " } else { "  " };
        out.push_str(&line(marker, cells.iter().map(String::as_str), &widths));
    }
    out
}

fn line<'a>(marker: &str, cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{marker}{}\n", padded.trim_end())
}

fn clip(cell: &str) -> String {
    let single_line = cell.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= MAX_CELL_WIDTH {
        return single_line;
    }
    let mut clipped = single_line.chars().take(MAX_CELL_WIDTH - 1).collect::<String>();
    clipped.push('…');
    clipped
}
