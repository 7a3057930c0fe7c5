use mumpsrs::{algebra::Arithmetic, layout::*};

#[test]
fn test_supported_versions() {
    for v in ["4.10.0", "5.0.2", "5.1.2", "5.2.1", "5.3.5", "5.4.1", "5.5.1", "5.6.2", "5.7.3"] {
        let version: MumpsVersion = v.parse().unwrap();
        assert!(version.is_supported(), "{v}");
        assert!(StructLayout::for_version(version, Arithmetic::Double).is_ok());
    }

    for v in ["4.9.2", "5.8.0", "6.0.0"] {
        let version: MumpsVersion = v.parse().unwrap();
        assert!(matches!(
            StructLayout::for_version(version, Arithmetic::Double),
            Err(LayoutError::UnsupportedVersion { .. })
        ));
    }

    assert!(matches!(
        "5.7".parse::<MumpsVersion>(),
        Err(LayoutError::BadVersionString(_))
    ));
}

#[test]
fn test_fields_by_release() {
    let layout = |v: &str| {
        StructLayout::for_version(v.parse().unwrap(), Arithmetic::Double).unwrap()
    };

    let v4 = layout("4.10.0");
    assert!(!v4.contains("keep"));
    assert!(!v4.contains("nnz"));
    assert_eq!(v4.field("icntl").unwrap().ty, FieldType::IntArray(40));

    let v5 = layout("5.0.1");
    assert!(v5.contains("keep"));
    assert!(v5.contains("colsca_from_mumps"));
    assert!(!v5.contains("nnz"));

    let v51 = layout("5.1.2");
    assert_eq!(v51.field("nnz").unwrap().ty, FieldType::Int8);
    assert!(v51.contains("save_dir"));

    let v52 = layout("5.2.1");
    assert_eq!(v52.field("icntl").unwrap().ty, FieldType::IntArray(60));
    assert_eq!(v52.field("infog").unwrap().ty, FieldType::IntArray(80));
    assert!(v52.contains("metis_options"));
    assert!(!v52.contains("nblk"));

    let v53 = layout("5.3.5");
    assert!(v53.contains("nblk"));
    assert!(v53.contains("blkptr"));

    // instance_number moved behind metis_options
    let v57 = layout("5.7.0");
    assert!(v57.contains("singular_values"));
    assert_eq!(v57.field("ooc_tmpdir").unwrap().ty, FieldType::Chars(1024));
    assert!(
        v57.offset_of("instance_number").unwrap() > v57.offset_of("metis_options").unwrap()
    );
    assert!(
        v53.offset_of("instance_number").unwrap() < v53.offset_of("version_number").unwrap()
    );
}

#[test]
fn test_probe_shares_leading_fields() {
    let probe = StructLayout::probe(Arithmetic::Double);
    let full = StructLayout::for_version(MumpsVersion::new(5, 7, 3), Arithmetic::ComplexDouble)
        .unwrap();

    // shares the leading fields of every release
    for name in ["sym", "par", "job", "comm_fortran", "icntl"] {
        assert_eq!(probe.offset_of(name).unwrap(), full.offset_of(name).unwrap());
    }
    assert!(probe.size() > full.size());
    assert_eq!(probe.version(), None);
}

#[test]
fn test_version_from_structure_bytes() {
    let mut aux = vec![0u8; 64];
    aux[10..15].copy_from_slice(b"5.6.2");
    assert_eq!(find_version(&aux), Some(MumpsVersion::new(5, 6, 2)));

    // characters outside '.'..='9' are dropped before matching
    let mut aux = b"xx4.10.0\0\0".to_vec();
    aux.extend_from_slice(&[0xff; 8]);
    assert_eq!(find_version(&aux), Some(MumpsVersion::new(4, 10, 0)));

    assert_eq!(find_version(&[0u8; 32]), None);
}
