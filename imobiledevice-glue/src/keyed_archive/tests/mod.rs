mod test_builder;

#[cfg(test)]
use plist::Value;

#[cfg(test)]
use crate::keyed_archive::KeyedArchive;

/// Check that the object table and counter agree and that every UID points into the table
#[cfg(test)]
fn assert_well_formed(archive: &KeyedArchive) {
    fn walk(node: &Value, len: usize) {
        match node {
            Value::Uid(uid) => assert!((uid.get() as usize) < len, "{uid:?} >= {len}"),
            Value::Array(items) => items.iter().for_each(|item| walk(item, len)),
            Value::Dictionary(dict) => dict.values().for_each(|item| walk(item, len)),
            _ => {}
        }
    }

    let objects = archive.objects().unwrap();
    assert_eq!(objects.len() as u64, archive.last_uid() + 1);
    assert_eq!(objects[0], Value::String("$null".to_string()));
    walk(&Value::Dictionary(archive.as_plist().clone()), objects.len());
}
