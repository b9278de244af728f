use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use medhx_cli::inspect::{ResponseInspection, VerificationInspection};
use medhx_cli::load::LoadOutcome;
use medhx_codec::CodeSet;
use medhx_dialects::codes::Severity;
use medhx_load::Reconciliation;

pub fn print_load_summary(outcome: &LoadOutcome) {
    println!("Transmission: {}", outcome.transmission.id);
    match &outcome.written {
        Some(path) => println!("Written: {}", path.display()),
        None => println!("Written: nothing, no patient could be included"),
    }
    println!("Archive as: {}", outcome.history_file_name);

    let mut table = Table::new();
    table.set_header(vec![header_cell("Included"), header_cell("Skipped")]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(outcome.requested_patient_ids.len()).fg(Color::Green),
        count_cell(outcome.skipped.len(), Color::Yellow),
    ]);
    println!("{table}");

    if outcome.skipped.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sequence"),
        header_cell("Patient"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for skipped in &outcome.skipped {
        table.add_row(vec![
            Cell::new(skipped.sequence),
            Cell::new(skipped.patient_id),
            Cell::new(&skipped.reason).fg(Color::Yellow),
        ]);
    }
    println!();
    println!("Skipped:");
    println!("{table}");
}

pub fn print_verification(inspection: &VerificationInspection) {
    let header = &inspection.file.header.data;
    println!("Transmission: {}", header.transmission_id);
    if let Some(name) = &inspection.name {
        println!(
            "Request: {} (accepted {})",
            name.request_file_name, name.accepted_at
        );
    }
    println!(
        "Status: {} {}",
        header.load_status.code(),
        header
            .load_status_description
            .as_deref()
            .unwrap_or_else(|| header.load_status.description())
    );

    let footer = &inspection.file.footer.data;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Processed"),
        header_cell("Loaded"),
        header_cell("Error records"),
        header_cell("Errors"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(footer.processed_count),
        Cell::new(footer.loaded_count),
        count_cell(footer.error_record_count as usize, Color::Red),
        count_cell(footer.total_error_count as usize, Color::Red),
    ]);
    println!("{table}");

    if !inspection.file.details.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Line"),
            header_cell("Row"),
            header_cell("Patient"),
            header_cell("Severity"),
            header_cell("Code"),
            header_cell("Field"),
            header_cell("Description"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 0, CellAlignment::Right);
        align_column(&mut table, 1, CellAlignment::Right);
        for row in &inspection.file.details {
            let detail = &row.data;
            table.add_row(vec![
                Cell::new(row.source.line()),
                Cell::new(detail.source_sequence),
                optional_cell(detail.patient_id.map(|id| id.to_string())),
                severity_cell(detail.severity),
                Cell::new(&detail.error_code),
                optional_cell(detail.field_name.clone()),
                Cell::new(&detail.error_description),
            ]);
        }
        println!();
        println!("Problems:");
        println!("{table}");
    }

    if let Some(reconciliation) = &inspection.reconciliation {
        print_reconciliation(reconciliation);
    }
}

fn print_reconciliation(reconciliation: &Reconciliation) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Outcome"), header_cell("Patients")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, count, color) in [
        ("Loaded", reconciliation.loaded.len(), Color::Green),
        ("Rejected", reconciliation.rejected.len(), Color::Red),
        ("Warned", reconciliation.warned.len(), Color::Yellow),
        ("Not requested", reconciliation.unknown.len(), Color::Red),
        ("Unattributed problems", reconciliation.unattributed, Color::Yellow),
    ] {
        table.add_row(vec![Cell::new(label), count_cell(count, color)]);
    }
    println!();
    println!("Reconciliation:");
    println!("{table}");
    for mismatch in &reconciliation.footer_mismatches {
        eprintln!(
            "warning: footer {} is {}, file has {}",
            mismatch.counter, mismatch.reported, mismatch.actual
        );
    }
}

pub fn print_response(inspection: &ResponseInspection) {
    let file = &inspection.file;
    println!("Transmission: {}", file.header.data.transmission_id);
    println!("Sent: {}", file.header.data.sent_time);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Line"),
        header_cell("Patient"),
        header_cell("Medication"),
        header_cell("Last filled"),
        header_cell("Pharmacy"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for row in &file.details {
        let detail = &row.data;
        table.add_row(vec![
            Cell::new(row.source.line()),
            Cell::new(format!(
                "{}, {}",
                detail.patient.last_name, detail.patient.first_name
            )),
            optional_cell(detail.medication.description.clone()),
            optional_cell(detail.medication.last_filled_date.map(|date| date.to_string())),
            optional_cell(detail.pharmacy.name.clone()),
        ]);
    }
    println!("{table}");

    if !file.rejected.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Line"), header_cell("Problem")]);
        apply_table_style(&mut table);
        align_column(&mut table, 0, CellAlignment::Right);
        for rejected in &file.rejected {
            table.add_row(vec![
                Cell::new(rejected.line()),
                Cell::new(&rejected.cause).fg(Color::Red),
            ]);
        }
        println!();
        println!("Rejected rows:");
        println!("{table}");
    }

    if !inspection.processed_count_matches {
        eprintln!(
            "warning: footer reports {} processed rows, file has {}",
            file.footer.data.processed_count,
            file.detail_line_count()
        );
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Fatal => Cell::new("FATAL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn optional_cell(value: Option<String>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
