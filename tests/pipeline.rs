use std::io::Write;

use flate2::write::GzEncoder;
use nirvana_filter::{run, segment, Config, FilterOptions, PipelineError, ReaderError};

const DOCUMENT: &str = r#"{"header":{"annotator":"Nirvana 3.18.1","genomeAssembly":"GRCh38"},"positions":[
{"chromosome":"chr1","position":10019},
{"chromosome":"chr1","position":10020,"variants":[{"vid":"1-10020-A-G","gnomad":{"allAf":0.00002},"transcripts":[{"transcript":"NM_1","hgnc":{"id":5}},{"transcript":"NM_2"}]},{"vid":"1-10020-A-T","gnomad":{"allAf":0.3}}]},
{"chromosome":"chr1","position":10021,"variants":[{"vid":"1-10021-C-T","gnomad":{"allAf":0.00001}}]}
],"genes":[
{"name":"A1BG","omim":[{"mimNumber":138670,"geneName":"Alpha-1-B glycoprotein"}]},
{"name":"LINC01128"}
]}
"#;

fn write_gzip(path: &std::path::Path, text: &str) {
    let mut encoder = GzEncoder::new(
        std::fs::File::create(path).unwrap(),
        flate2::Compression::default(),
    );
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

#[test]
fn run_writes_all_tables() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.json.gz");
    write_gzip(&input, DOCUMENT);

    let config = Config::new(&input)
        .output(dir.path().join("transcripts.csv"))
        .variants_output(dir.path().join("variants.csv"))
        .genes_output(dir.path().join("genes.csv"));
    let summary = run(&config).unwrap();

    assert_eq!(
        summary.header,
        r#"{"annotator":"Nirvana 3.18.1","genomeAssembly":"GRCh38"}"#
    );
    assert_eq!(summary.position_count, 3);
    assert_eq!(summary.gene_count, 2);
    assert_eq!(summary.variant_count, 2);
    assert_eq!(summary.transcript_variant_count, 1);
    assert_eq!(summary.transcript_row_count, 2);

    let transcripts = std::fs::read_to_string(dir.path().join("transcripts.csv")).unwrap();
    assert_eq!(
        transcripts,
        "variant_id,transcript,hgnc.id\n1-10020-A-G,NM_1,5\n1-10020-A-G,NM_2,\n"
    );

    let variants = std::fs::read_to_string(dir.path().join("variants.csv")).unwrap();
    assert_eq!(
        variants,
        "variant_id,gnomAD_allele_freq\n1-10020-A-G,0.00002\n1-10021-C-T,0.00001\n"
    );

    let genes = std::fs::read_to_string(dir.path().join("genes.csv")).unwrap();
    assert_eq!(
        genes,
        "gene,OMIM_gene_name\nA1BG,Alpha-1-B glycoprotein\nLINC01128,\n"
    );
}

#[test]
fn run_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.json.gz");
    write_gzip(&input, DOCUMENT);

    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    run(&Config::new(&input).output(&first)).unwrap();
    run(&Config::new(&input).output(&second)).unwrap();

    assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
}

#[test]
fn run_with_custom_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.json.gz");
    write_gzip(&input, DOCUMENT);

    let config = Config::new(&input)
        .output(dir.path().join("out.csv"))
        .filter(FilterOptions::new().threshold(0.5));
    let summary = run(&config).unwrap();
    assert_eq!(summary.variant_count, 3);
    assert_eq!(summary.transcript_variant_count, 1);
}

#[test]
fn summary_display_matches_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.json.gz");
    write_gzip(&input, DOCUMENT);

    let summary = run(&Config::new(&input).output(dir.path().join("out.csv"))).unwrap();
    assert_eq!(
        summary.to_string(),
        concat!(
            r#"header object: {"annotator":"Nirvana 3.18.1","genomeAssembly":"GRCh38"}"#,
            "\nnumber of positions: 3\nnumber of genes: 2"
        )
    );
}

#[test]
fn segment_counts_before_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.json.gz");
    let broken = DOCUMENT.replace(r#""position":10019}"#, r#""position":10019"#);
    write_gzip(&input, &broken);

    let config = Config::new(&input).output(dir.path().join("out.csv"));
    let doc = segment(&config).unwrap();
    assert_eq!(doc.position_count(), 3);
    assert_eq!(doc.gene_count(), 2);

    match run(&config) {
        Err(PipelineError::Reader(ReaderError::Decode { index, .. })) => assert_eq!(index, 0),
        other => panic!("expected a decode error, got {other:?}"),
    }
    assert!(!dir.path().join("out.csv").exists());
}

#[test]
fn run_rejects_unexpected_layout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pretty.json.gz");
    write_gzip(&input, "{\n  \"header\": {}\n}\n");

    let result = run(&Config::new(&input).output(dir.path().join("out.csv")));
    assert!(matches!(
        result,
        Err(PipelineError::Reader(ReaderError::StructuralMismatch { .. }))
    ));
}
