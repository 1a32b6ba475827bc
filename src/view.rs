/*!
 * Ranking presentation.
 *
 * Front-ends render a batch through the `RankingView` trait so the grid,
 * plain-text and JSON outputs stay interchangeable over the same core.
 */

use serde::Serialize;
use std::io::{self, BufRead, Write};

use crate::app_config::ViewStyle;
use crate::database::RankingEntry;

/// Message shown when a batch has no players
pub const EMPTY_RANKING_MESSAGE: &str = "Nenhum jogador encontrado para este histórico.";

/// Renders one batch's ranking
pub trait RankingView {
    /// Write `entries` (already in ranking order) for `batch_id` to `out`
    fn render(&self, batch_id: &str, entries: &[RankingEntry], out: &mut dyn Write) -> io::Result<()>;
}

/// Build the view for a configured style
pub fn view_for(style: ViewStyle) -> Box<dyn RankingView> {
    match style {
        ViewStyle::Table => Box::new(TableView),
        ViewStyle::Text => Box::new(TextView),
        ViewStyle::Json => Box::new(JsonView),
    }
}

/// Format a score with two decimals and comma thousands separators,
/// e.g. `1234.5` as `1,234.50`
pub fn format_score(score: f64) -> String {
    if !score.is_finite() {
        return score.to_string();
    }

    let formatted = format!("{:.2}", score.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if score < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Grid with a header row
pub struct TableView;

impl RankingView for TableView {
    fn render(&self, batch_id: &str, entries: &[RankingEntry], out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Ranking de {}", batch_id)?;
        if entries.is_empty() {
            return writeln!(out, "{}", EMPTY_RANKING_MESSAGE);
        }

        let headers = ["Posição", "Nome do Jogador", "Nível", "Pontuação"];
        let rows: Vec<[String; 4]> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                [
                    (i + 1).to_string(),
                    entry.name.clone(),
                    entry.level.to_string(),
                    format_score(entry.score),
                ]
            })
            .collect();

        let mut widths = headers.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        writeln!(
            out,
            "{:^w0$} | {:<w1$} | {:^w2$} | {:>w3$}",
            headers[0],
            headers[1],
            headers[2],
            headers[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        )?;
        writeln!(
            out,
            "{}-+-{}-+-{}-+-{}",
            "-".repeat(widths[0]),
            "-".repeat(widths[1]),
            "-".repeat(widths[2]),
            "-".repeat(widths[3]),
        )?;
        for row in &rows {
            writeln!(
                out,
                "{:^w0$} | {:<w1$} | {:^w2$} | {:>w3$}",
                row[0],
                row[1],
                row[2],
                row[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
                w3 = widths[3],
            )?;
        }
        Ok(())
    }
}

/// One line per player, suited to scrolling output
pub struct TextView;

impl RankingView for TextView {
    fn render(&self, batch_id: &str, entries: &[RankingEntry], out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Ranking de {}", batch_id)?;
        if entries.is_empty() {
            return writeln!(out, "{}", EMPTY_RANKING_MESSAGE);
        }
        for (i, entry) in entries.iter().enumerate() {
            writeln!(
                out,
                "{}. {} (Nível {}) - {} pontos",
                i + 1,
                entry.name,
                entry.level,
                format_score(entry.score)
            )?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonRanking<'a> {
    batch_id: &'a str,
    players: Vec<JsonPlayer<'a>>,
}

#[derive(Serialize)]
struct JsonPlayer<'a> {
    position: usize,
    name: &'a str,
    level: i64,
    score: f64,
}

/// Pretty-printed JSON document
pub struct JsonView;

impl RankingView for JsonView {
    fn render(&self, batch_id: &str, entries: &[RankingEntry], out: &mut dyn Write) -> io::Result<()> {
        let document = JsonRanking {
            batch_id,
            players: entries
                .iter()
                .enumerate()
                .map(|(i, entry)| JsonPlayer {
                    position: i + 1,
                    name: &entry.name,
                    level: entry.level,
                    score: entry.score,
                })
                .collect(),
        };
        serde_json::to_writer_pretty(&mut *out, &document)?;
        writeln!(out)
    }
}

/// Ask before deleting a batch. Only an explicit yes confirms.
pub fn confirm_deletion<R: BufRead, W: Write>(batch_id: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(
        output,
        "Tem certeza que deseja excluir o histórico de importação de {}? Esta ação não pode ser desfeita. [s/N] ",
        batch_id
    )?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    ))
}
