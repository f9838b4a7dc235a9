use crate::types::OutputFormat;
use anyhow::Result;
use is_terminal::IsTerminal;
use mess_engine::{ColumnSpec, FieldDescriptor, ReferenceOption, Widget};
use mess_types::Record;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

const MAX_CELL_WIDTH: usize = 40;

/// Writes command results to stdout as aligned tables or JSON
#[derive(Debug, Clone, Copy)]
pub struct Presenter {
    format: OutputFormat,
    color: bool,
}

impl Presenter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: format == OutputFormat::Plain && std::io::stdout().is_terminal(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn info(&self, title: &str, models: &[&str]) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&json!({ "title": title, "models": models }));
        }

        self.heading(title);
        if models.is_empty() {
            println!("No models.");
        }
        for model in models {
            println!("  {}", model);
        }
        Ok(())
    }

    pub fn columns(&self, columns: &[ColumnSpec]) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&columns);
        }

        let rows: Vec<Vec<String>> = columns
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.kind.to_string(),
                    if c.visible { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        self.table(&["FIELD", "TYPE", "VISIBLE"], &rows);
        Ok(())
    }

    pub fn fields(&self, fields: &[FieldDescriptor]) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&fields);
        }

        let rows: Vec<Vec<String>> = fields
            .iter()
            .map(|f| {
                let widget = match &f.widget {
                    Widget::Reference { model } => format!("reference -> {}", model),
                    other => other.as_str().to_string(),
                };
                vec![f.name.clone(), f.kind.to_string(), widget]
            })
            .collect();
        self.table(&["FIELD", "KIND", "WIDGET"], &rows);
        Ok(())
    }

    /// Grid view: visible columns only, in column order.
    pub fn rows(&self, columns: &[ColumnSpec], rows: &[Record]) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&rows);
        }

        if rows.is_empty() {
            println!("No records.");
            return Ok(());
        }

        let visible: Vec<&ColumnSpec> = columns.iter().filter(|c| c.visible).collect();
        let headers: Vec<&str> = visible.iter().map(|c| c.name.as_str()).collect();
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                visible
                    .iter()
                    .map(|c| row.get(&c.field).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
        self.table(&headers, &cells);
        Ok(())
    }

    pub fn options(&self, options: &[ReferenceOption]) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&options);
        }

        let rows: Vec<Vec<String>> = options
            .iter()
            .map(|o| vec![o.id.clone(), o.label.clone()])
            .collect();
        self.table(&["ID", "LABEL"], &rows);
        Ok(())
    }

    pub fn record(&self, verb: &str, model: &str, record: &Record) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(record);
        }

        let id = record.identity().unwrap_or_default();
        if self.color {
            println!("{} {} {}", verb.green().bold(), model, id.dimmed());
        } else {
            println!("{} {} {}", verb, model, id);
        }
        for (name, value) in record.iter() {
            println!("  {}: {}", name, value);
        }
        Ok(())
    }

    pub fn message(&self, message: &str) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&json!({ "message": message }));
        }
        println!("{}", message);
        Ok(())
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn heading(&self, text: &str) {
        if self.color {
            println!("{}", text.bold());
        } else {
            println!("{}", text);
        }
    }

    fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        let rendered = render_table(headers, rows);
        let mut lines = rendered.lines();
        if let Some(header) = lines.next() {
            self.heading(header);
        }
        for line in lines {
            println!("{}", line);
        }
    }
}

fn truncate(cell: &str) -> String {
    let flat = cell.replace('\n', " ");
    if flat.chars().count() <= MAX_CELL_WIDTH {
        return flat;
    }
    let mut cut: String = flat.chars().take(MAX_CELL_WIDTH - 1).collect();
    cut.push('…');
    cut
}

/// Left-aligned columns separated by two spaces, header first.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|c| truncate(c)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    for row in &rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_aligns_columns() {
        let table = render_table(
            &["name", "admin"],
            &[
                vec!["Ada".to_string(), "true".to_string()],
                vec!["Grace Hopper".to_string(), String::new()],
            ],
        );

        assert_eq!(
            table,
            "name          admin\nAda           true\nGrace Hopper"
        );
    }

    #[test]
    fn test_render_table_truncates_long_cells() {
        let long = "x".repeat(60);
        let table = render_table(&["v"], &[vec![long]]);
        let row = table.lines().nth(1).unwrap();

        assert_eq!(row.chars().count(), MAX_CELL_WIDTH);
        assert!(row.ends_with('…'));
    }
}
