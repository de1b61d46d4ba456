use crate::Result;
use crate::attr::Value;
use crate::hierarchy::OperationType;
use crate::trace::{RawOperation, TraceSpec};
use anyhow::{Context, bail};
use regex::Regex;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;

/// Parse a platform driver log into a flat trace, one operation per uuid in
/// first-seen order.
///
/// Only lines carrying the GRANULA marker are read; everything else the driver
/// logged is skipped. Expected record shape (after any log prefix):
/// GRANULA - OperationUuid:<id> ActorType:<actor> MissionType:<mission> InfoName:<name> InfoValue:<value>
///
/// Example:
/// 2015-09-09 12:00:01 [main] INFO  [GraphX] GRANULA - OperationUuid:7b1 ActorType:TopActor MissionType:TopMission InfoName:StartTime InfoValue:1441792801000
pub fn parse_log_file(path: &str) -> Result<TraceSpec> {
    let text = fs::read_to_string(path).with_context(|| format!("read log file {}", path))?;
    parse_log_text(&text, path)
}

fn parse_log_text(text: &str, path: &str) -> Result<TraceSpec> {
    // Capture:
    // 1) operation uuid
    // 2) actor type
    // 3) mission type
    // 4) info name
    // 5) info value: rest of line, may contain spaces
    let re = Regex::new(
        r#"GRANULA\s+-\s+OperationUuid:(\S+)\s+ActorType:(\S+)\s+MissionType:(\S+)\s+InfoName:(\S+)\s+InfoValue:(.*?)\s*$"#,
    )?;

    let mut operations: Vec<RawOperation> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();

    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        if !line.contains("GRANULA") {
            continue;
        }

        let Some(caps) = re.captures(line) else {
            bail!(
                "log parse error at {}:{}: cannot parse record: {:?}",
                path,
                lno,
                line.trim()
            );
        };
        let field = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();

        let uuid = field(1);
        let op_type = OperationType::composite(field(2), field(3));
        let info_name = field(4);
        let info_value = Value::parse_raw(field(5));

        let slot = match index.entry(uuid.to_string()) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                operations.push(RawOperation {
                    id: uuid.to_string(),
                    op_type: op_type.clone(),
                    parent: None,
                    attributes: BTreeMap::new(),
                    children: Vec::new(),
                });
                *e.insert(operations.len() - 1)
            }
        };
        let op = &mut operations[slot];

        if op.op_type != op_type {
            bail!(
                "operation {} changes type at {}:{}: {} then {}",
                uuid,
                path,
                lno,
                op.op_type,
                op_type
            );
        }
        if op
            .attributes
            .insert(info_name.to_string(), info_value)
            .is_some()
        {
            bail!(
                "duplicate info {} for operation {} at {}:{}",
                info_name,
                uuid,
                path,
                lno
            );
        }
    }

    Ok(TraceSpec { operations })
}
