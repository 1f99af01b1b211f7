/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::collections::HashMap;

use super::ber::Value;
use super::pdu::VarBind;

pub type TableRow = HashMap<String, Value>;

/// Fold the flat, column-major varbind sequence of a walk into a list
/// of row maps, keyed by column id. With num_base_nodes set, the
/// column id is the sub-identifier at that offset and the row id the
/// joined remainder; without it, the last two sub-identifiers are
/// used. Each row carries a synthetic column "0" holding its row id.
/// Rows keep first-seen order.
pub fn tablify(varbinds: &[VarBind], num_base_nodes: usize) -> Vec<TableRow> {
    let mut order: Vec<String> = Vec::new();
    let mut rows: HashMap<String, TableRow> = HashMap::new();

    for bind in varbinds {
        let ids = bind.oid.as_slice();
        let (col_id, row_id) = match num_base_nodes {
            0 => match ids {
                [.., col, row] => (col.to_string(), row.to_string()),
                _ => continue,
            },
            n => match ids.get(n..) {
                Some([col, row @ ..]) if !row.is_empty() => (
                    col.to_string(),
                    row.iter()
                        .map(u32::to_string)
                        .collect::<Vec<_>>()
                        .join("."),
                ),
                _ => continue,
            },
        };

        let row = rows.entry(row_id.clone()).or_insert_with(|| {
            order.push(row_id.clone());
            HashMap::from([(
                String::from("0"),
                Value::OctetString(row_id.clone().into_bytes()),
            )])
        });
        row.insert(col_id, bind.value.clone());
    }

    order
        .into_iter()
        .filter_map(|row_id| rows.remove(&row_id))
        .collect()
}
