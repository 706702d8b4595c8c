//! Dispatch through the method adapter for a class with working capability
//! implementations.

use hostbind::prelude::*;
use hostbind::{
    AdapterOptions, CoercionMode, FailureKind, HeapRefs, HostArray, ObjectHandle, RegistryOptions,
};
use hostbind_core::ArrayKey;
use hostbind_core::test_utils::init_test_logging;

/// A small ordered collection backed by a `HostArray`.
#[derive(Default)]
struct Bag {
    items: HostArray,
    cursor: usize,
}

impl Bag {
    fn entry(&self) -> Option<(&ArrayKey, &Value)> {
        self.items.iter().nth(self.cursor)
    }
}

impl HeapRefs for Bag {
    fn heap_refs(&self) -> Vec<ObjectHandle> {
        self.items.heap_refs()
    }
}

impl Countable for Bag {
    fn count(&self) -> i64 {
        self.items.len() as i64
    }
}

impl HostIterator for Bag {
    fn current(&self) -> Value {
        self.entry().map(|(_, v)| v.clone()).unwrap_or(Value::Null)
    }

    fn key(&self) -> Value {
        match self.entry() {
            Some((ArrayKey::Int(i), _)) => Value::Int(*i),
            Some((ArrayKey::Str(s), _)) => Value::from_string(s.clone()),
            None => Value::Null,
        }
    }

    fn next(&mut self) {
        self.cursor += 1;
    }

    fn rewind(&mut self) {
        self.cursor = 0;
    }

    fn valid(&self) -> bool {
        self.cursor < self.items.len()
    }
}

impl SeekableIterator for Bag {
    fn seek(&mut self, position: i64) -> Result<(), NativeError> {
        if position < 0 || position as usize >= self.items.len() {
            return Err(NativeError::other(format!("seek position {position} is out of range")));
        }
        self.cursor = position as usize;
        Ok(())
    }
}

impl ArrayAccess for Bag {
    fn offset_exists(&self, offset: &Value) -> Result<bool, NativeError> {
        Ok(self.items.contains_key(&ArrayKey::from_value(offset)?))
    }

    fn offset_get(&self, offset: &Value) -> Result<Value, NativeError> {
        let key = ArrayKey::from_value(offset)?;
        Ok(self.items.get(&key).cloned().unwrap_or(Value::Null))
    }

    fn offset_set(&mut self, offset: &Value, value: Value) -> Result<Option<Value>, NativeError> {
        if offset.is_null() {
            self.items.push(value);
            return Ok(None);
        }
        Ok(self.items.insert(ArrayKey::from_value(offset)?, value))
    }

    fn offset_unset(&mut self, offset: &Value) -> Result<Option<Value>, NativeError> {
        Ok(self.items.remove(&ArrayKey::from_value(offset)?))
    }
}

const BAG: &str = "Test\\Bag";

fn bag_class() -> ClassDescriptor {
    let methods = MethodTable::new()
        .with_countable::<Bag>()
        .with_iterator::<Bag>()
        .with_seekable_iterator::<Bag>()
        .with_array_access::<Bag>();
    ClassDescriptor::register("Bag", "Test", methods)
        .unwrap()
        .with_capability(Capability::Countable)
        .with_capability(Capability::SeekableIterator)
        .with_capability(Capability::ArrayAccess)
}

fn setup() -> (Context, RawReceiver) {
    init_test_logging();
    let mut ctx = Context::new();
    ctx.install(bag_class()).unwrap();
    let this = ctx.instantiate_owning(BAG, Bag::default()).unwrap();
    (ctx, this)
}

fn call(ctx: &mut Context, this: &RawReceiver, method: &str, args: &[Value]) -> Value {
    ctx.call(BAG, method, Some(this.clone()), args).unwrap()
}

#[test]
fn seekable_implies_iterator() {
    let (ctx, _) = setup();
    let class = ctx.class(BAG).unwrap();
    assert!(class.implements(Capability::Iterator));
    assert!(class.contract_gaps().is_empty());
}

#[test]
fn array_access_round_trip() {
    let (mut ctx, this) = setup();
    call(&mut ctx, &this, "offsetSet", &[Value::from_string("a"), Value::Int(1)]);
    call(&mut ctx, &this, "offsetSet", &[Value::Null, Value::Int(2)]);

    assert_eq!(call(&mut ctx, &this, "count", &[]), Value::Int(2));
    assert_eq!(
        call(&mut ctx, &this, "offsetGet", &[Value::from_string("a")]),
        Value::Int(1)
    );
    assert_eq!(
        call(&mut ctx, &this, "offsetExists", &[Value::Int(0)]),
        Value::Bool(true)
    );

    call(&mut ctx, &this, "offsetUnset", &[Value::from_string("a")]);
    assert_eq!(
        call(&mut ctx, &this, "offsetExists", &[Value::from_string("a")]),
        Value::Bool(false)
    );
    assert!(ctx.runtime().ledger.is_balanced());
}

#[test]
fn iteration_protocol() {
    let (mut ctx, this) = setup();
    for v in [10, 20, 30] {
        call(&mut ctx, &this, "offsetSet", &[Value::Null, Value::Int(v)]);
    }

    let mut seen = Vec::new();
    call(&mut ctx, &this, "rewind", &[]);
    while call(&mut ctx, &this, "valid", &[]) == Value::Bool(true) {
        let key = call(&mut ctx, &this, "key", &[]);
        let current = call(&mut ctx, &this, "current", &[]);
        seen.push((key, current));
        call(&mut ctx, &this, "next", &[]);
    }
    assert_eq!(
        seen,
        vec![
            (Value::Int(0), Value::Int(10)),
            (Value::Int(1), Value::Int(20)),
            (Value::Int(2), Value::Int(30)),
        ]
    );
}

#[test]
fn seek_coerces_numeric_strings() {
    let (mut ctx, this) = setup();
    for v in [10, 20, 30] {
        call(&mut ctx, &this, "offsetSet", &[Value::Null, Value::Int(v)]);
    }
    call(&mut ctx, &this, "seek", &[Value::from_string("2")]);
    assert_eq!(call(&mut ctx, &this, "current", &[]), Value::Int(30));
}

#[test]
fn seek_out_of_range_is_reported() {
    let (mut ctx, this) = setup();
    let err = ctx
        .call(BAG, "seek", Some(this), &[Value::Int(5)])
        .unwrap_err();
    assert!(matches!(
        err,
        HostbindError::Adapter(AdapterError::Body {
            source: NativeError::Other { .. },
            ..
        })
    ));
    let failures = ctx.runtime().failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, FailureKind::Exception);
    assert_eq!(failures[0].method, "seek");
}

#[test]
fn non_numeric_seek_position_is_a_warning() {
    let (mut ctx, this) = setup();
    let err = ctx
        .call(BAG, "seek", Some(this), &[Value::from_string("abc")])
        .unwrap_err();
    match err {
        HostbindError::Adapter(err) => {
            assert!(err.is_recoverable());
            assert_eq!(err.position(), Some(0));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ctx.runtime().failures()[0].kind, FailureKind::Warning);
}

#[test]
fn lenient_coercion_uses_numeric_prefix() {
    init_test_logging();
    let mut ctx = Context::with_options(
        AdapterOptions {
            coercion: CoercionMode::Lenient,
            ..AdapterOptions::default()
        },
        RegistryOptions::default(),
    );
    ctx.install(bag_class()).unwrap();
    let this = ctx.instantiate_owning(BAG, Bag::default()).unwrap();
    for v in [10, 20] {
        call(&mut ctx, &this, "offsetSet", &[Value::Null, Value::Int(v)]);
    }
    call(&mut ctx, &this, "seek", &[Value::from_string("1 apple")]);
    assert_eq!(call(&mut ctx, &this, "current", &[]), Value::Int(20));
}

#[test]
fn stored_arrays_stay_alive_until_unset() {
    let (mut ctx, this) = setup();
    let array = ctx.runtime_mut().heap.allocate(HostArray::new());
    call(&mut ctx, &this, "offsetSet", &[Value::Int(0), Value::Array(array)]);

    // The caller drops its reference; the bag keeps one.
    ctx.runtime_mut().heap.release(array);
    assert_eq!(ctx.runtime().heap.ref_count(array), Some(1));

    let fetched = call(&mut ctx, &this, "offsetGet", &[Value::Int(0)]);
    assert_eq!(fetched, Value::Array(array));
    assert_eq!(ctx.runtime().heap.ref_count(array), Some(2));
    ctx.runtime_mut().heap.release(array);

    call(&mut ctx, &this, "offsetUnset", &[Value::Int(0)]);
    assert!(!ctx.runtime().heap.contains(array));
}

#[test]
fn freeing_the_bag_releases_what_it_stored() {
    let (mut ctx, this) = setup();
    let array = ctx.runtime_mut().heap.allocate(HostArray::new());
    call(&mut ctx, &this, "offsetSet", &[Value::Null, Value::Array(array)]);
    ctx.runtime_mut().heap.release(array);

    let RawReceiver::Managed(Value::Object(bag)) = this else {
        unreachable!()
    };
    assert!(ctx.runtime_mut().heap.release(bag));
    assert!(!ctx.runtime().heap.contains(array));
    assert_eq!(ctx.runtime().heap.live_count(), 0);
}
