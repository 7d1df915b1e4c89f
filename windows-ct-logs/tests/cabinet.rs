#![cfg(feature = "cab")]

mod common;

use std::io::{Cursor, Write};

use common::*;
use time::macros::datetime;
use windows_ct_logs::{extract_der, CtlError, TrustList, AUTHROOT_STL};

fn cabinet(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = cab::CabinetBuilder::new();
    {
        let folder = builder.add_folder(cab::CompressionType::None);
        for (name, _) in members {
            folder.add_file(*name);
        }
    }

    let mut writer = builder.build(Cursor::new(vec![])).unwrap();
    let mut data = members.iter().map(|(_, data)| data);
    while let Some(mut file) = writer.next_file().unwrap() {
        file.write_all(data.next().unwrap()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn authroot_stl() -> Vec<u8> {
    let list = ct_log_list(&[1], &[spki(10, 0xaa), spki(20, 0xbb)]);
    envelope(&ctl(
        &[0x05],
        datetime!(2025-03-14 09:26:53 UTC),
        Some(&[extension(CT_LOG_LIST, false, &list)]),
    ))
}

#[test]
fn test_extract_der() {
    let der = authroot_stl();
    let archive = cabinet(&[(AUTHROOT_STL, der.as_slice())]);

    assert_eq!(extract_der(Cursor::new(archive)).unwrap(), der);
}

#[test]
fn test_from_cab() {
    let der = authroot_stl();
    let archive = cabinet(&[("readme.txt", &b"hello"[..]), (AUTHROOT_STL, der.as_slice())]);

    let trust_list = TrustList::from_cab(Cursor::new(archive)).unwrap();
    assert_eq!(trust_list, windows_ct_logs::decode(&der).unwrap());
    assert_eq!(trust_list.logs, [spki(10, 0xaa), spki(20, 0xbb)]);
}

#[test]
fn test_from_cab_missing_member() {
    let archive = cabinet(&[("authroot.der", authroot_stl().as_slice())]);

    let err = TrustList::from_cab(Cursor::new(archive)).unwrap_err();
    assert!(matches!(err, CtlError::Io(_)), "{err:?}");
}

#[test]
fn test_from_cab_not_a_cabinet() {
    let err = TrustList::from_cab(Cursor::new(authroot_stl())).unwrap_err();
    assert!(matches!(err, CtlError::Io(_)), "{err:?}");
}

#[test]
fn test_from_cab_malformed_member() {
    let mut der = authroot_stl();
    der.truncate(der.len() - 1);
    let archive = cabinet(&[(AUTHROOT_STL, der.as_slice())]);

    match TrustList::from_cab(Cursor::new(archive)) {
        Err(CtlError::Decode(err)) => assert_eq!(err.kind(), windows_ct_logs::ErrorKind::Length),
        other => panic!("expected a decode error, got {other:?}"),
    }
}
