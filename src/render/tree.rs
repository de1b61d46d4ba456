use crate::view::{OperationView, ReportData};
use std::fmt::Write;

/// Indented outline of the annotated hierarchy, then the failure list.
///
/// Example:
/// TopActor-TopMission [top]
///   Summary = TopActorTopMission.
///   StartTime = 10
///   GraphX-LoadGraph [load]
///     Duration = 30
pub fn render_text_report(data: &ReportData) -> anyhow::Result<String> {
    let mut out = String::new();

    for root in &data.roots {
        write_operation(&mut out, data, root, 0)?;
    }

    if !data.failures.is_empty() {
        writeln!(out, "\n{} failure(s):", data.failures.len())?;
        for f in &data.failures {
            writeln!(out, "  - {}", f)?;
        }
    }
    writeln!(
        out,
        "\n{} operations, {} derived attributes, {} rule applications",
        data.totals.operations, data.totals.derived_attributes, data.totals.rule_applications
    )?;

    Ok(out)
}

fn write_operation(
    out: &mut String,
    data: &ReportData,
    id: &str,
    depth: usize,
) -> anyhow::Result<()> {
    let Some(OperationView {
        op_type,
        derived,
        children,
        ..
    }) = data.operations.get(id)
    else {
        anyhow::bail!("report references unknown operation {}", id);
    };

    let indent = "  ".repeat(depth);
    writeln!(out, "{}{} [{}]", indent, op_type, id)?;

    // Summary first; the rest in name order.
    if let Some(summary) = derived.get("Summary") {
        writeln!(out, "{}  Summary = {}", indent, summary)?;
    }
    for (name, value) in derived.iter().filter(|(n, _)| n.as_str() != "Summary") {
        writeln!(out, "{}  {} = {}", indent, name, value)?;
    }

    for child in children {
        write_operation(out, data, child, depth + 1)?;
    }
    Ok(())
}
