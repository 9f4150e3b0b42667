#[cfg(test)]
mod builder_tests {
    use std::io::Cursor;

    use plist::{Dictionary, Uid, Value};

    use crate::{
        error::keyed_archive::KeyedArchiveError,
        keyed_archive::{tests::assert_well_formed, ArchiveValue, KeyedArchive, MAX_DEPTH},
        util::dates::from_apple_seconds,
    };

    fn string(text: &str) -> Value {
        Value::String(text.to_string())
    }

    #[test]
    fn can_create_empty_archive() {
        let archive = KeyedArchive::new();

        assert_eq!(archive.objects().unwrap(), &vec![string("$null")]);
        assert_eq!(archive.last_uid(), 0);
        assert_eq!(archive.top_uid(None), None);
        assert_well_formed(&archive);
    }

    #[test]
    fn can_order_root_keys() {
        let mut archive = KeyedArchive::new();
        let keys: Vec<&String> = archive.as_plist().keys().collect();
        assert_eq!(keys, vec!["$version", "$objects", "$archiver"]);

        archive.add_top_class("NSArray", &["NSObject"]).unwrap();
        let keys: Vec<&String> = archive.as_plist().keys().collect();
        assert_eq!(keys, vec!["$version", "$objects", "$archiver", "$top"]);
    }

    #[test]
    fn can_append_class_pair() {
        let mut archive = KeyedArchive::new();
        let uid = archive.append_class("NSArray", &["NSObject"]).unwrap();
        assert_eq!(uid, 1);

        let instance = archive.class(1).unwrap();
        assert_eq!(instance.get("$class"), Some(&Value::Uid(Uid::new(2))));

        let info = archive.class(2).unwrap();
        assert_eq!(info.get("$classname"), Some(&string("NSArray")));
        assert_eq!(
            info.get("$classes"),
            Some(&Value::Array(vec![string("NSArray"), string("NSObject")]))
        );
        assert_eq!(archive.classname(1), Some("NSArray"));
        assert_eq!(archive.classname(2), None);
        assert_well_formed(&archive);
    }

    #[test]
    fn cant_append_unnamed_class() {
        let mut archive = KeyedArchive::new();
        assert!(matches!(
            archive.append_class("", &[]),
            Err(KeyedArchiveError::InvalidArgument(_))
        ));
        assert_eq!(archive.last_uid(), 0);
    }

    #[test]
    fn can_build_empty_array() {
        let mut archive = KeyedArchive::new();
        let uid = archive.add_top_class("NSArray", &["NSObject"]).unwrap();
        archive
            .set_class_property(uid, "NS.objects", ArchiveValue::Array(&Value::Array(vec![])))
            .unwrap();

        assert_eq!(archive.objects().unwrap().len(), 3);
        assert_well_formed(&archive);

        let bytes = archive.to_binary().unwrap();
        let parsed = KeyedArchive::from_plist(&Value::from_reader(Cursor::new(bytes)).unwrap()).unwrap();
        assert_eq!(parsed.to_plist().unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn can_build_dictionary_item() {
        let mut archive = KeyedArchive::new();
        let uid = archive.add_top_class("NSDictionary", &["NSObject"]).unwrap();
        archive
            .nsdictionary_add_item(uid, "k", ArchiveValue::String("v"))
            .unwrap();

        let mut expected = Dictionary::new();
        expected.insert("k".to_string(), string("v"));
        assert_eq!(archive.to_plist().unwrap(), Value::Dictionary(expected));

        // Key then value, each as its own string object
        let objects = archive.objects().unwrap();
        assert_eq!(objects[3], string("k"));
        assert_eq!(objects[4], string("v"));
        assert_well_formed(&archive);
    }

    #[test]
    fn can_append_array_items() {
        let mut archive = KeyedArchive::new();
        let uid = archive.add_top_class("NSMutableArray", &["NSArray", "NSObject"]).unwrap();
        archive.nsarray_append_item(uid, ArchiveValue::IntRef(7)).unwrap();
        archive.nsarray_append_item(uid, ArchiveValue::Boolean(true)).unwrap();
        archive.nsarray_append_item(uid, ArchiveValue::Real(0.5)).unwrap();
        archive.nsarray_append_item(uid, ArchiveValue::String("$null")).unwrap();

        assert_eq!(
            archive.to_plist().unwrap(),
            Value::Array(vec![
                Value::Integer(7u64.into()),
                Value::Boolean(true),
                Value::Real(0.5),
                string("$null"),
            ])
        );
        assert_eq!(archive.last_uid(), 5);
        assert_well_formed(&archive);
    }

    #[test]
    fn can_set_null_property_without_appending() {
        let mut archive = KeyedArchive::new();
        let uid = archive.add_top_class("NSString", &["NSObject"]).unwrap();
        let before = archive.objects().unwrap().len();

        archive
            .set_class_property(uid, "NS.string", ArchiveValue::String("$null"))
            .unwrap();

        assert_eq!(
            archive.class_property(uid, "NS.string"),
            Some(&Value::Uid(Uid::new(0)))
        );
        assert_eq!(archive.objects().unwrap().len(), before);
        assert_eq!(archive.last_uid(), 2);
        assert_well_formed(&archive);

        // Any other string is appended as its own object
        archive
            .set_class_property(uid, "NS.string", ArchiveValue::String("null"))
            .unwrap();
        assert_eq!(
            archive.class_property(uid, "NS.string"),
            Some(&Value::Uid(Uid::new(3)))
        );
        assert_eq!(archive.objects().unwrap().len(), before + 1);
    }

    #[test]
    fn cant_append_to_non_array_property() {
        let mut archive = KeyedArchive::new();
        let uid = archive.add_top_class("NSArray", &["NSObject"]).unwrap();
        archive
            .set_class_property(uid, "NS.objects", ArchiveValue::Integer(1))
            .unwrap();

        let result = archive.nsarray_append_item(uid, ArchiveValue::IntRef(1));
        assert!(matches!(result, Err(KeyedArchiveError::InvalidType(_, _))));
        assert_eq!(archive.last_uid(), 2);
    }

    #[test]
    fn cant_set_property_out_of_range() {
        let mut archive = KeyedArchive::new();
        let result = archive.set_class_property(9, "NS.string", ArchiveValue::String("x"));

        assert!(matches!(result, Err(KeyedArchiveError::UidOutOfRange(9, 1))));
        assert_eq!(archive.last_uid(), 0);
    }

    #[test]
    fn can_add_multiple_top_classes() {
        let mut archive = KeyedArchive::new();
        let first = archive.add_top_class("NSArray", &["NSObject"]).unwrap();
        let second = archive.add_top_class("NSString", &["NSObject"]).unwrap();

        assert_eq!(archive.top_uid(None), Some(first));
        assert_eq!(archive.top_uid(Some("$1")), Some(second));
        assert_well_formed(&archive);
    }

    #[test]
    fn cant_add_top_uid_out_of_range() {
        let mut archive = KeyedArchive::new();
        assert!(matches!(
            archive.add_top_class_uid(3),
            Err(KeyedArchiveError::UidOutOfRange(3, 1))
        ));
        assert_eq!(archive.top_uid(None), None);
    }

    #[test]
    fn can_rename_top_key() {
        let mut archive = KeyedArchive::new();
        let first = archive.add_top_class("NSArray", &["NSObject"]).unwrap();
        let second = archive.add_top_class("NSArray", &["NSObject"]).unwrap();
        archive.set_top_ref_key_name("root").unwrap();

        let top = archive.as_plist().get("$top").unwrap().as_dictionary().unwrap();
        let keys: Vec<&String> = top.keys().collect();
        assert_eq!(keys, vec!["root", "$1"]);
        assert_eq!(archive.top_uid(Some("root")), Some(first));
        assert_eq!(archive.top_uid(None), Some(first));
        assert_eq!(archive.top_uid(Some("$1")), Some(second));
    }

    #[test]
    fn can_skip_rename_without_top() {
        let mut archive = KeyedArchive::new();
        archive.set_top_ref_key_name("root").unwrap();
        assert_eq!(archive, KeyedArchive::new());
    }

    #[test]
    fn cant_rename_top_key_onto_another_entry() {
        let mut archive = KeyedArchive::new();
        let first = archive.add_top_class("NSArray", &["NSObject"]).unwrap();
        let second = archive.add_top_class("NSArray", &["NSObject"]).unwrap();
        let before = archive.clone();

        assert!(matches!(
            archive.set_top_ref_key_name("$1"),
            Err(KeyedArchiveError::InvalidArgument(_))
        ));
        assert_eq!(archive, before);
        assert_eq!(archive.top_uid(Some("$0")), Some(first));
        assert_eq!(archive.top_uid(Some("$1")), Some(second));

        // Renaming the first entry to its own name is allowed
        archive.set_top_ref_key_name("$0").unwrap();
        assert_eq!(archive, before);
    }

    #[test]
    fn can_append_string_class_type() {
        let mut archive = KeyedArchive::new();
        archive
            .append_class_type(ArchiveValue::NSString("hello"))
            .unwrap();

        assert_eq!(archive.top_uid(None), Some(1));
        assert_eq!(archive.classname(1), Some("NSString"));
        assert_eq!(archive.class_string_property(1, "NS.string").unwrap(), "hello");
        assert_eq!(archive.to_plist().unwrap(), string("hello"));
        assert_well_formed(&archive);
    }

    #[test]
    fn can_append_null_class_type() {
        let mut archive = KeyedArchive::new();
        archive.append_class_type(ArchiveValue::String("$null")).unwrap();

        assert_eq!(archive.top_uid(None), Some(0));
        assert_eq!(archive.last_uid(), 0);
        assert_eq!(archive.to_plist().unwrap(), string("$null"));
    }

    #[test]
    fn can_keep_existing_top_on_append_class_type() {
        let mut archive = KeyedArchive::new();
        let first = archive.add_top_class("NSArray", &["NSObject"]).unwrap();
        archive.append_class_type(ArchiveValue::IntRef(5)).unwrap();

        assert_eq!(archive.top_uid(None), Some(first));
        assert_eq!(archive.object(3).unwrap(), &Value::Integer(5u64.into()));
    }

    #[test]
    fn cant_append_inline_class_type() {
        let mut archive = KeyedArchive::new();
        for value in [
            ArchiveValue::Integer(1),
            ArchiveValue::Chars("x"),
            ArchiveValue::Data(&[1]),
        ] {
            assert!(matches!(
                archive.append_class_type(value),
                Err(KeyedArchiveError::InvalidArgument(_))
            ));
        }
        assert_eq!(archive.last_uid(), 0);
    }

    #[test]
    fn can_keep_data_class_chains_apart() {
        let mut archive = KeyedArchive::new();
        let uid = archive.add_top_class("NSArray", &["NSObject"]).unwrap();
        archive.nsarray_append_item(uid, ArchiveValue::NSData(&[1])).unwrap();
        archive
            .nsarray_append_item(uid, ArchiveValue::NSMutableData(&[2]))
            .unwrap();

        assert_eq!(archive.classname(3), Some("NSData"));
        assert_eq!(archive.classname(5), Some("NSMutableData"));
        assert_eq!(
            archive.class(6).unwrap().get("$classes"),
            Some(&Value::Array(vec![
                string("NSMutableData"),
                string("NSData"),
                string("NSObject")
            ]))
        );
        assert_eq!(
            archive.to_plist().unwrap(),
            Value::Array(vec![Value::Data(vec![1]), Value::Data(vec![2])])
        );
    }

    #[test]
    fn can_build_date() {
        let mut archive = KeyedArchive::new();
        archive.append_class_type(ArchiveValue::NSDate(694_224_000.5)).unwrap();

        assert_eq!(
            archive.to_plist().unwrap(),
            Value::Date(from_apple_seconds(694_224_000.5).unwrap())
        );
    }

    #[test]
    fn can_build_url_with_base() {
        let mut archive = KeyedArchive::new();
        archive
            .append_class_type(ArchiveValue::NSUrl {
                base: Some(Box::new(ArchiveValue::String("$null"))),
                relative: Some(Box::new(ArchiveValue::String("file:///tmp/"))),
            })
            .unwrap();

        assert_eq!(archive.classname(1), Some("NSURL"));
        assert_eq!(archive.class_property(1, "NS.base"), Some(&Value::Uid(Uid::new(0))));
        assert_eq!(archive.class_string_property(1, "NS.relative").unwrap(), "file:///tmp/");
        assert_well_formed(&archive);
    }

    #[test]
    fn can_drop_relative_url_without_base() {
        let mut archive = KeyedArchive::new();
        archive
            .append_class_type(ArchiveValue::NSUrl {
                base: None,
                relative: Some(Box::new(ArchiveValue::String("file:///tmp/"))),
            })
            .unwrap();

        assert_eq!(archive.class_property(1, "NS.relative"), None);
        assert_eq!(archive.last_uid(), 2);
    }

    #[test]
    fn can_read_integer_properties() {
        let mut archive = KeyedArchive::new();
        let uid = archive.add_top_class("NSObject", &[]).unwrap();
        archive.set_class_property(uid, "inline", ArchiveValue::Integer(3)).unwrap();
        archive.set_class_property(uid, "boxed", ArchiveValue::IntRef(4)).unwrap();
        archive
            .set_class_property(uid, "wide", ArchiveValue::Integer(u32::MAX as u64))
            .unwrap();

        assert_eq!(archive.class_uint64_property(uid, "inline").unwrap(), 3);
        assert_eq!(archive.class_uint64_property(uid, "boxed").unwrap(), 4);
        assert_eq!(archive.class_int_property(uid, "boxed").unwrap(), 4);
        assert!(matches!(
            archive.class_int_property(uid, "wide"),
            Err(KeyedArchiveError::InvalidType(_, _))
        ));
        assert!(matches!(
            archive.class_uint64_property(uid, "missing"),
            Err(KeyedArchiveError::MissingKey(_))
        ));
    }

    #[test]
    fn cant_read_inline_string_property() {
        let mut archive = KeyedArchive::new();
        let uid = archive.add_top_class("NSObject", &[]).unwrap();
        archive.set_class_property(uid, "name", ArchiveValue::Chars("x")).unwrap();

        assert_eq!(archive.class_property(uid, "name"), Some(&string("x")));
        assert!(matches!(
            archive.class_string_property(uid, "name"),
            Err(KeyedArchiveError::InvalidType(_, _))
        ));
    }

    #[test]
    fn can_build_from_plist() {
        let mut inner = Dictionary::new();
        inner.insert("flag".to_string(), Value::Boolean(true));
        inner.insert("skipped".to_string(), Value::Real(1.5));
        inner.insert("count".to_string(), Value::Integer(2u64.into()));
        inner.insert("name".to_string(), string("x"));
        let tree = Value::Array(vec![
            string("first"),
            Value::Dictionary(inner),
            Value::Array(vec![string("nested")]),
        ]);

        let mut archive = KeyedArchive::new();
        archive.append_class_type(ArchiveValue::FromPlist(&tree)).unwrap();

        assert_eq!(archive.classname(1), Some("NSMutableArray"));
        assert_eq!(archive.classname(3), Some("NSMutableString"));

        let flat = archive.to_plist().unwrap();
        let items = flat.as_array().unwrap();
        assert_eq!(items[0], string("first"));
        assert_eq!(items[2], Value::Array(vec![string("nested")]));

        let dict = items[1].as_dictionary().unwrap();
        let keys: Vec<&String> = dict.keys().collect();
        assert_eq!(keys, vec!["flag", "count", "name"]);
        assert_eq!(dict.get("count"), Some(&Value::Integer(2u64.into())));
        assert_well_formed(&archive);
    }

    #[test]
    fn cant_build_from_plist_scalar() {
        let mut archive = KeyedArchive::new();
        let tree = Value::Real(1.0);
        assert!(matches!(
            archive.append_class_type(ArchiveValue::FromPlist(&tree)),
            Err(KeyedArchiveError::InvalidType(_, _))
        ));
    }

    #[test]
    fn can_merge_archive() {
        let mut sub = KeyedArchive::new();
        sub.append_class_type(ArchiveValue::NSArray(vec![
            ArchiveValue::NSString("a"),
            ArchiveValue::String("b"),
            ArchiveValue::String("$null"),
        ]))
        .unwrap();

        let mut archive = KeyedArchive::new();
        let uid = archive.add_top_class("NSDictionary", &["NSObject"]).unwrap();
        archive
            .nsdictionary_add_item(uid, "sub", ArchiveValue::NSKeyedArchive(&sub))
            .unwrap();
        archive
            .nsdictionary_add_item(uid, "after", ArchiveValue::IntRef(1))
            .unwrap();

        let flat = archive.to_plist().unwrap();
        let dict = flat.as_dictionary().unwrap();
        assert_eq!(
            dict.get("sub"),
            Some(&Value::Array(vec![string("a"), string("b"), string("$null")]))
        );
        assert_eq!(dict.get("after"), Some(&Value::Integer(1u64.into())));

        // Merged objects follow the key and land in the order they are reached
        assert_eq!(archive.classname(4), Some("NSArray"));
        assert_eq!(archive.classname(6), Some("NSString"));
        assert_well_formed(&archive);
    }

    #[test]
    fn can_merge_empty_archive_as_null() {
        let sub = KeyedArchive::new();
        let mut archive = KeyedArchive::new();
        archive.append_class_type(ArchiveValue::NSKeyedArchive(&sub)).unwrap();

        assert_eq!(archive.top_uid(None), Some(0));
        assert_eq!(archive.last_uid(), 0);
    }

    #[test]
    fn can_merge_object_in_place() {
        let mut sub = KeyedArchive::new();
        sub.append_class_type(ArchiveValue::NSMutableString("x")).unwrap();

        let mut archive = KeyedArchive::new();
        archive.append_object(string("padding")).unwrap();
        let mut node = Value::Array(vec![Value::Uid(Uid::new(1)), Value::Uid(Uid::new(0))]);
        archive.merge_object(&sub, &mut node).unwrap();

        assert_eq!(
            node,
            Value::Array(vec![Value::Uid(Uid::new(2)), Value::Uid(Uid::new(0))])
        );
        assert_eq!(archive.classname(2), Some("NSMutableString"));
        assert_eq!(archive.object_to_plist(2).unwrap(), string("x"));
        assert_well_formed(&archive);
    }

    #[test]
    fn cant_build_past_max_depth() {
        let mut value = ArchiveValue::NSArray(vec![]);
        for _ in 0..600 {
            value = ArchiveValue::NSArray(vec![value]);
        }

        let mut archive = KeyedArchive::new();
        assert!(matches!(
            archive.append_class_type(value),
            Err(KeyedArchiveError::RecursionLimit(MAX_DEPTH))
        ));
    }

    #[test]
    fn cant_merge_cyclic_archive() {
        let mut source = KeyedArchive::new();
        let uid = source.add_top_class("NSArray", &["NSObject"]).unwrap();
        let cycle = Value::Array(vec![Value::Uid(Uid::new(uid))]);
        source
            .set_class_property(uid, "NS.objects", ArchiveValue::Array(&cycle))
            .unwrap();

        let mut archive = KeyedArchive::new();
        assert!(matches!(
            archive.append_class_type(ArchiveValue::NSKeyedArchive(&source)),
            Err(KeyedArchiveError::RecursionLimit(MAX_DEPTH))
        ));
    }
}
