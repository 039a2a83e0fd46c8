//! Test helpers for composing CLI datasets and layered overrides.

use super::*;
use bzip2::{Compression, write::BzEncoder};
use camino::Utf8Path;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Clone, Default)]
pub(super) struct LayerOverrides {
    pub(super) input_file: Option<Utf8PathBuf>,
    pub(super) out_dir: Option<Utf8PathBuf>,
    pub(super) language_id: Option<String>,
}

/// A temporary directory holding one small dump in plain and bzip2 form.
#[derive(Debug)]
pub(super) struct DumpFixture {
    _dir: TempDir,
    root: Utf8PathBuf,
}

const DUMP: &str = concat!(
    "[\n",
    r#"{"id":"Q42","type":"item","labels":{"en":{"language":"en","value":"Douglas Adams"},"de":{"language":"de","value":"Douglas Adams"}},"descriptions":{"en":{"language":"en","value":"English writer"}},"aliases":{"en":[{"language":"en","value":"Douglas Noel Adams"}]},"sitelinks":{"enwiki":{"site":"enwiki","title":"Douglas Adams"}},"claims":{"P31":[{"id":"Q42$1","mainsnak":{"snaktype":"value","property":"P31","datatype":"wikibase-item","datavalue":{"type":"wikibase-entityid","value":{"id":"Q5"}}}}]}},"#,
    "\n",
    r#"{"id":"P31","type":"property","labels":{"en":{"language":"en","value":"instance of"}}},"#,
    "\n",
    r#"{"id":"Q1","type":"item","labels":{"en":{"language":"en","value":"Universe"}},"claims":{"P31":[{"id":"Q1$1","mainsnak":{"snaktype":"value","property":"P31","datatype":"wikibase-item","datavalue":{"type":"wikibase-entityid","value":{"id":"Q36906466"}}}}]}}"#,
    "\n]\n"
);

impl DumpFixture {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        fs::write(root.join("dump.json"), DUMP).expect("write dump");
        let mut encoder = BzEncoder::new(Vec::new(), Compression::fast());
        std::io::Write::write_all(&mut encoder, DUMP.as_bytes()).expect("compress dump");
        let compressed = encoder.finish().expect("finish bzip2 stream");
        fs::write(root.join("dump.json.bz2"), compressed).expect("write compressed dump");
        fs::write(root.join("config.json"), DUMP).expect("write config dump");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn plain(&self) -> Utf8PathBuf {
        self.root.join("dump.json")
    }

    pub(super) fn compressed(&self) -> Utf8PathBuf {
        self.root.join("dump.json.bz2")
    }

    pub(super) fn config_dump(&self) -> Utf8PathBuf {
        self.root.join("config.json")
    }

    pub(super) fn out_dir(&self) -> Utf8PathBuf {
        self.root.join("tables")
    }
}

/// A table directory with a few `entity_rels` rows split across files.
pub(super) struct TableFixture {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl TableFixture {
    pub(super) fn entity_rels() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        fs::write(
            root.join("0.jsonl"),
            concat!(
                r#"{"claim_id":"c1","entity_id":"Q42","property_id":"P31","value":"Q5"}"#,
                "\n",
                r#"{"claim_id":"c2","entity_id":"Q64","property_id":"P17","value":"Q183"}"#,
                "\n"
            ),
        )
        .expect("write batch 0");
        fs::write(
            root.join("1.jsonl"),
            concat!(
                r#"{"claim_id":"c3","entity_id":"Q1","property_id":"P31","value":"Q5"}"#,
                "\n"
            ),
        )
        .expect("write batch 1");
        Self { _dir: dir, root }
    }

    pub(super) fn dir(&self) -> &Utf8Path {
        &self.root
    }
}

/// Apply file and environment layers beneath the CLI values, then convert.
pub(super) fn merge_layers(
    mut cli_args: PreprocessArgs,
    file_layer: Option<LayerOverrides>,
    env_layer: Option<LayerOverrides>,
) -> Result<PipelineConfig, CliError> {
    merge_field(
        &mut cli_args.input_file,
        extract_field(&env_layer, |layer| &layer.input_file),
        extract_field(&file_layer, |layer| &layer.input_file),
    );
    merge_field(
        &mut cli_args.out_dir,
        extract_field(&env_layer, |layer| &layer.out_dir),
        extract_field(&file_layer, |layer| &layer.out_dir),
    );
    merge_field(
        &mut cli_args.language_id,
        extract_field(&env_layer, |layer| &layer.language_id),
        extract_field(&file_layer, |layer| &layer.language_id),
    );
    PipelineConfig::try_from(cli_args)
}

fn merge_field<T: Clone>(target: &mut Option<T>, env_value: Option<T>, file_value: Option<T>) {
    if target.is_none()
        && let Some(value) = env_value.or(file_value)
    {
        *target = Some(value);
    }
}

fn extract_field<T: Clone>(
    layer: &Option<LayerOverrides>,
    accessor: fn(&LayerOverrides) -> &Option<T>,
) -> Option<T> {
    layer.as_ref().and_then(|entry| accessor(entry).clone())
}
