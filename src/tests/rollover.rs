use crate::prelude::*;
use crate::tests::toolkit::{check_record, generate_v3, header_field, long_name, stage};
use std::fs::read_to_string;
use tempfile::tempdir;

#[test]
fn leading_epochs_return_to_their_day() {
    let dir = tempdir().unwrap();
    let day1 = dir.path().join(long_name(150));
    let day2 = dir.path().join(long_name(151));

    // day 1 was closed too late: its last 3 epochs belong to day 2
    generate_v3(
        &day1,
        &[
            (2023, 5, 30, 0, 0, 0.0),
            (2023, 5, 30, 12, 0, 0.0),
            (2023, 5, 31, 0, 0, 30.0),
            (2023, 5, 31, 0, 1, 0.0),
            (2023, 5, 31, 0, 1, 30.0),
        ],
    );
    generate_v3(
        &day2,
        &[(2023, 5, 31, 0, 2, 0.0), (2023, 5, 31, 6, 0, 0.0)],
    );

    let opts = Opts {
        // previous day is added to the sequence
        inputs: Inputs::Files(vec![long_name(151)]),
        fix_missing: true,
        obs_dir: dir.path().to_path_buf(),
        tmp_dir: dir.path().to_path_buf(),
        placement: Placement::Replace { backup: true },
        ..Default::default()
    };

    let report = crate::editor::run(&opts).unwrap();
    assert_eq!(report.outputs, vec![day1.clone(), day2.clone()]);

    let check = check_record(&day1);
    assert_eq!(check.epochs, 2);
    assert_eq!(
        header_field(&day1, "TIME OF FIRST OBS").unwrap().trim_end(),
        "  2023     5    30     0     0    0.0000000     GPS"
    );
    assert_eq!(
        header_field(&day1, "TIME OF LAST OBS").unwrap().trim_end(),
        "  2023     5    30    12     0    0.0000000     GPS"
    );

    let check = check_record(&day2);
    assert_eq!(check.epochs, 5);
    assert!(check.epoch_lines[0].starts_with("> 2023 05 31 00 00 30.0000000"));
    assert_eq!(
        header_field(&day2, "TIME OF FIRST OBS").unwrap().trim_end(),
        "  2023     5    31     0     0   30.0000000     GPS"
    );
    assert_eq!(
        header_field(&day2, "TIME OF LAST OBS").unwrap().trim_end(),
        "  2023     5    31     6     0    0.0000000     GPS"
    );

    for day in [&day1, &day2] {
        assert!(header_field(day, "COMMENT")
            .unwrap()
            .starts_with("Processed by rnxedit"));
        let mut backup = day.as_os_str().to_owned();
        backup.push(".original");
        assert!(std::path::Path::new(&backup).exists());
    }
}

#[test]
fn late_epochs_return_to_their_day() {
    let dir = tempdir().unwrap();
    let day1 = dir.path().join(long_name(150));
    let day2 = dir.path().join(long_name(151));

    // day 2 was opened too early: its first epoch belongs to day 1
    generate_v3(
        &day1,
        &[(2023, 5, 30, 0, 0, 0.0), (2023, 5, 30, 23, 59, 0.0)],
    );
    generate_v3(
        &day2,
        &[
            (2023, 5, 30, 23, 59, 30.0),
            (2023, 5, 31, 0, 0, 0.0),
            (2023, 5, 31, 0, 0, 30.0),
        ],
    );

    let opts = Opts {
        inputs: Inputs::Files(vec![long_name(150), long_name(151)]),
        fix_missing: true,
        obs_dir: dir.path().to_path_buf(),
        tmp_dir: dir.path().to_path_buf(),
        placement: Placement::Replace { backup: false },
        ..Default::default()
    };

    let report = crate::editor::run(&opts).unwrap();
    // day 149 is not available
    assert_eq!(report.missing, vec![dir.path().join(long_name(149))]);
    assert_eq!(report.outputs.len(), 2);

    assert_eq!(check_record(&day1).epochs, 3);
    assert_eq!(
        header_field(&day1, "TIME OF LAST OBS").unwrap().trim_end(),
        "  2023     5    30    23    59   30.0000000     GPS"
    );
    assert_eq!(check_record(&day2).epochs, 2);
    assert_eq!(
        header_field(&day2, "TIME OF FIRST OBS").unwrap().trim_end(),
        "  2023     5    31     0     0    0.0000000     GPS"
    );
}

#[test]
fn well_bounded_days_are_conserved() {
    let dir = tempdir().unwrap();
    stage(dir.path(), &[150, 151, 152]);
    let before: usize = [150, 151, 152]
        .iter()
        .map(|doy| check_record(&dir.path().join(long_name(*doy))).epochs)
        .sum();

    let opts = Opts {
        inputs: Inputs::Files(vec![long_name(151), long_name(152)]),
        fix_missing: true,
        exclusion: "R".parse().unwrap(),
        obs_dir: dir.path().to_path_buf(),
        tmp_dir: dir.path().to_path_buf(),
        placement: Placement::Replace { backup: false },
        ..Default::default()
    };

    let report = crate::editor::run(&opts).unwrap();
    assert_eq!(report.outputs.len(), 3);

    let after: usize = report
        .outputs
        .iter()
        .map(|path| {
            let check = check_record(path);
            assert!(check.satellites.iter().all(|sv| !sv.starts_with('R')));
            assert_eq!(
                header_field(path, "# OF SATELLITES").unwrap().trim(),
                check.satellites.len().to_string()
            );
            check.epochs
        })
        .sum();
    assert_eq!(before, after);

    // no scratch files left behind
    let leftovers = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);
    assert!(read_to_string(dir.path().join(long_name(150)))
        .unwrap()
        .contains("Processed by rnxedit"));
}

#[test]
fn empty_day_within_sequence_is_left_untouched() {
    let dir = tempdir().unwrap();
    let path = |doy: u16| dir.path().join(long_name(doy));

    generate_v3(&path(150), &[(2023, 5, 30, 0, 0, 0.0), (2023, 5, 30, 12, 0, 0.0)]);
    // day 151 was never recorded
    generate_v3(&path(151), &[]);
    generate_v3(&path(152), &[(2023, 6, 1, 0, 0, 0.0), (2023, 6, 1, 12, 0, 0.0)]);
    generate_v3(&path(153), &[(2023, 6, 2, 0, 0, 0.0), (2023, 6, 2, 12, 0, 0.0)]);
    let empty_day = read_to_string(path(151)).unwrap();

    let opts = Opts {
        inputs: Inputs::Files(vec![long_name(151), long_name(153)]),
        fix_missing: true,
        obs_dir: dir.path().to_path_buf(),
        tmp_dir: dir.path().to_path_buf(),
        placement: Placement::Replace { backup: false },
        ..Default::default()
    };

    let report = crate::editor::run(&opts).unwrap();
    assert_eq!(report.outputs, vec![path(150), path(152), path(153)]);
    assert_eq!(read_to_string(path(151)).unwrap(), empty_day);

    for (doy, date) in [(150, "> 2023 05 30"), (152, "> 2023 06 01"), (153, "> 2023 06 02")] {
        let check = check_record(&path(doy));
        assert_eq!(check.epochs, 2, "day {}", doy);
        assert!(
            check.epoch_lines.iter().all(|l| l.starts_with(date)),
            "day {} holds {:?}",
            doy,
            check.epoch_lines
        );
    }
}
