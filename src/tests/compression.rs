use crate::prelude::*;
use crate::tests::toolkit::{check_record, contains_constellation, generate_v3, long_name};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::fs::{read, remove_file, write, File};
use std::io::{Read, Write};
use std::path::Path;
use tempfile::tempdir;

fn gzip(path: &Path) {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&read(path).unwrap()).unwrap();
    let mut gz = path.as_os_str().to_owned();
    gz.push(".gz");
    write(&gz, encoder.finish().unwrap()).unwrap();
    remove_file(path).unwrap();
}

fn gunzip(path: &Path, output: &Path) {
    let mut decoder = GzDecoder::new(File::open(path).unwrap());
    let mut content = String::new();
    decoder.read_to_string(&mut content).unwrap();
    write(output, content).unwrap();
}

#[test]
fn gzip_inputs_are_restored() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join(long_name(150));
    generate_v3(
        &plain,
        &[
            (2023, 5, 30, 0, 0, 0.0),
            (2023, 5, 30, 0, 0, 30.0),
            (2023, 5, 30, 0, 1, 0.0),
        ],
    );
    gzip(&plain);
    let gz = dir.path().join(format!("{}.gz", long_name(150)));
    assert!(gz.exists());

    let opts = Opts {
        // compressed variant is looked up
        inputs: Inputs::Files(vec![plain.to_string_lossy().to_string()]),
        exclusion: "R".parse().unwrap(),
        tmp_dir: dir.path().to_path_buf(),
        placement: Placement::Replace { backup: true },
        ..Default::default()
    };

    let report = crate::editor::run(&opts).unwrap();
    assert_eq!(report.outputs, vec![plain.clone()]);

    // readable copy is gone, original was compressed back
    assert!(!plain.exists());
    assert!(gz.exists());

    // backup is the original, as found
    let backup = dir.path().join(format!("{}.gz.original", long_name(150)));
    assert!(backup.exists());

    let edited = dir.path().join("edited.rnx");
    gunzip(&gz, &edited);
    assert!(!contains_constellation(&edited, 'R'));
    let check = check_record(&edited);
    assert_eq!(check.epochs, 3);
    assert_eq!(check.satellites.len(), 3);

    let restored = dir.path().join("restored.rnx");
    gunzip(&backup, &restored);
    assert!(contains_constellation(&restored, 'R'));
}

#[test]
fn untouched_inputs_are_not_recompressed() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join(long_name(150));
    generate_v3(&plain, &[(2023, 5, 30, 0, 0, 0.0)]);
    gzip(&plain);
    let gz = dir.path().join(format!("{}.gz", long_name(150)));
    let before = read(&gz).unwrap();

    let opts = Opts {
        inputs: Inputs::Files(vec![gz.to_string_lossy().to_string()]),
        exclusion: "C".parse().unwrap(),
        tmp_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let report = crate::editor::run(&opts).unwrap();
    assert_eq!(report.scratch, vec![dir.path().join("rnx.tmp")]);
    assert!(!plain.exists());
    assert_eq!(read(&gz).unwrap(), before);
}
