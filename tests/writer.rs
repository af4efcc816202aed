use std::io::Read;

use flate2::read::MultiGzDecoder;
use nirvana_filter::{
    flatten_transcripts, FlattenOptions, GeneRow, TranscriptVariant, VariantRow, Writer,
};
use serde_json::json;

fn transcripts(value: serde_json::Value) -> Vec<nirvana_filter::JsonObject> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_object().unwrap().clone())
        .collect()
}

fn render<T: nirvana_filter::Tabular + ?Sized>(table: &T) -> String {
    let mut buf = Vec::new();
    Writer::to_writer(table, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn write_variant_table() {
    let rows = vec![
        VariantRow::new("1-10020-A-G".into(), 0.00005),
        VariantRow::new("1-10021-C-T".into(), 0.0),
    ];
    assert_eq!(
        render(rows.as_slice()),
        "variant_id,gnomAD_allele_freq\n1-10020-A-G,0.00005\n1-10021-C-T,0\n"
    );
}

#[test]
fn write_gene_table_quotes_commas() {
    let rows = vec![
        GeneRow::new("BRCA2".into(), "BRCA2 DNA repair associated".into()),
        GeneRow::new("HLA-A".into(), "Major histocompatibility complex, class I, A".into()),
        GeneRow::new("LINC01128".into(), String::new()),
    ];
    assert_eq!(
        render(rows.as_slice()),
        concat!(
            "gene,OMIM_gene_name\n",
            "BRCA2,BRCA2 DNA repair associated\n",
            "HLA-A,\"Major histocompatibility complex, class I, A\"\n",
            "LINC01128,\n",
        )
    );
}

#[test]
fn write_transcript_table_with_gaps() {
    let variants = vec![
        TranscriptVariant::new(
            "v1".into(),
            0.00001,
            transcripts(json!([
                {"transcript": "NM_1", "hgnc": {"id": 5}},
                {"transcript": "NM_2", "isCanonical": true}
            ])),
        ),
        TranscriptVariant::new("v2".into(), 0.00002, Vec::new()),
        TranscriptVariant::new(
            "v3".into(),
            0.00003,
            transcripts(json!([{"transcript": "ENST3", "codons": null, "consequence": ["a", "b"]}])),
        ),
    ];
    let table = flatten_transcripts(&variants, &FlattenOptions::default());
    assert_eq!(
        render(&table),
        concat!(
            "variant_id,transcript,hgnc.id,isCanonical,codons,consequence\n",
            "v1,NM_1,5,,,\n",
            "v1,NM_2,,true,,\n",
            "v3,ENST3,,,,\"[\"\"a\"\",\"\"b\"\"]\"\n",
        )
    );
}

#[test]
fn write_empty_transcript_table_keeps_header() {
    let table = flatten_transcripts(&[], &FlattenOptions::default());
    assert_eq!(render(&table), "variant_id\n");
}

#[test]
fn write_to_path_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    let variants = vec![TranscriptVariant::new(
        "v1".into(),
        0.00001,
        transcripts(json!([{"b": 1, "a": 2}, {"c": 3}])),
    )];
    let table = flatten_transcripts(&variants, &FlattenOptions::default());
    Writer::to_path(&first, &table).unwrap();
    Writer::to_path(&second, &table).unwrap();

    let first = std::fs::read(first).unwrap();
    let second = std::fs::read(second).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        String::from_utf8(first).unwrap(),
        "variant_id,b,a,c\nv1,1,2,\nv1,,,3\n"
    );
}

#[test]
fn write_gzip_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("genes.csv.gz");
    let rows = vec![GeneRow::new("TP53".into(), "Tumor protein p53".into())];
    Writer::to_path(&path, rows.as_slice()).unwrap();

    let mut text = String::new();
    MultiGzDecoder::new(std::fs::File::open(&path).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, "gene,OMIM_gene_name\nTP53,Tumor protein p53\n");
}

#[test]
fn write_gzip_output_has_complete_trailer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("variants.csv.gz");
    let rows = vec![VariantRow::new("1-100-A-G".into(), 0.00002)];
    Writer::to_path(&path, rows.as_slice()).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

    let expected = "variant_id,gnomAD_allele_freq\n1-100-A-G,0.00002\n";
    let stored_len = u32::from_le_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
    assert_eq!(stored_len as usize, expected.len());

    let mut text = String::new();
    flate2::read::GzDecoder::new(bytes.as_slice())
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, expected);
}
