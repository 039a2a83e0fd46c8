//! Unit tests for the table writer.

use super::*;
use crate::test_support::MemorySink;
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use wikitables_core::{AliasRow, Row, Snak, SnakType, TableRows, UnrecognisedSnak};

fn aliases(count: usize) -> TableRows {
    let mut rows = TableRows::default();
    for index in 0..count {
        rows.push(
            Table::Aliases,
            Row::Alias(AliasRow {
                entity_id: format!("Q{index}"),
                alias: format!("alias {index}"),
            }),
        );
    }
    rows
}

fn output(batch_id: u64, rows: TableRows) -> BatchOutput {
    BatchOutput {
        batch_id,
        worker_id: 0,
        rows,
        unrecognised: Vec::new(),
    }
}

fn unknown_snak() -> UnrecognisedSnak {
    UnrecognisedSnak {
        entity_id: "Q1".into(),
        datatype: "entity-schema".into(),
        payload: Snak {
            snaktype: SnakType::Value,
            property: Some("P1".into()),
            hash: None,
            datatype: Some("entity-schema".into()),
            datavalue: None,
        },
    }
}

#[fixture]
fn writer() -> TableWriter<MemorySink> {
    TableWriter::new(MemorySink::new(), 3)
}

#[rstest]
fn full_batch_rolls_to_next_index(mut writer: TableWriter<MemorySink>) {
    writer.write_batch(output(0, aliases(3))).expect("write");
    writer.write_batch(output(1, aliases(1))).expect("write");

    let (report, sink) = writer.finish().expect("finish");
    assert_eq!(sink.batch_indices(Table::Aliases), vec![0, 1]);
    assert_eq!(sink.batch(Table::Aliases, 0).len(), 3);
    assert_eq!(sink.batch(Table::Aliases, 1).len(), 1);
    assert_eq!(report.batch_files, 2);
    assert_eq!(report.rows_written.get(&Table::Aliases), Some(&4));
    assert!(sink.is_finished());
}

#[rstest]
fn partial_batch_keeps_its_index(mut writer: TableWriter<MemorySink>) {
    writer.write_batch(output(0, aliases(2))).expect("write");
    assert_eq!(writer.rotation().cursor(Table::Aliases).batch_index, 0);
    writer.write_batch(output(1, aliases(1))).expect("write");
    assert_eq!(writer.rotation().cursor(Table::Aliases).batch_index, 1);

    let (_, sink) = writer.finish().expect("finish");
    assert_eq!(sink.batch_indices(Table::Aliases), vec![0]);
}

#[rstest]
fn run_stops_at_finished(writer: TableWriter<MemorySink>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    tx.send(WriterMessage::Batch(output(0, aliases(1))))
        .expect("send");
    tx.send(WriterMessage::Finished).expect("send");
    tx.send(WriterMessage::Batch(output(1, aliases(1))))
        .expect("send");

    let (report, sink) = writer.run(&rx).expect("run");
    assert_eq!(report.batches, 1);
    assert_eq!(sink.rows(Table::Aliases).len(), 1);
}

#[rstest]
fn unrecognised_snaks_are_logged_per_worker(mut writer: TableWriter<MemorySink>) {
    let mut batch = output(0, TableRows::default());
    batch.worker_id = 4;
    batch.unrecognised = vec![unknown_snak(), unknown_snak()];
    writer.write_batch(batch).expect("write");

    let (report, sink) = writer.finish().expect("finish");
    assert_eq!(report.unrecognised_written, 2);
    assert_eq!(sink.unrecognised(4).len(), 2);
    assert!(sink.unrecognised(0).is_empty());
}

#[rstest]
fn jsonl_sink_writes_table_and_error_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().join("out")).expect("utf-8 path");
    let sink = JsonlSink::create(&root).expect("create sink");
    let mut writer = TableWriter::new(sink, 2);

    let mut batch = output(0, aliases(3));
    batch.worker_id = 2;
    batch.unrecognised = vec![unknown_snak()];
    writer.write_batch(batch).expect("write");
    writer.write_batch(output(1, aliases(1))).expect("write");
    writer.finish().expect("finish");

    let first = std::fs::read_to_string(root.join("aliases/0.jsonl")).expect("batch 0");
    let second = std::fs::read_to_string(root.join("aliases/1.jsonl")).expect("batch 1");
    assert_eq!(first.lines().count(), 3);
    assert_eq!(second.lines().count(), 1);
    for line in first.lines().chain(second.lines()) {
        let row: AliasRow = serde_json::from_str(line).expect("row should parse");
        assert!(row.entity_id.starts_with('Q'));
    }

    let errors = std::fs::read_to_string(root.join("errors/errors-2.jsonl")).expect("error log");
    let logged: serde_json::Value = serde_json::from_str(errors.trim()).expect("error line");
    assert_eq!(
        logged,
        serde_json::json!({"snaktype": "value", "property": "P1", "datatype": "entity-schema"})
    );
    assert!(root.join("labels").as_std_path().is_dir());
}
