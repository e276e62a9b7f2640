#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use wirebox::{Arguments, Class, Container, Flags, Parameter, ParameterType, TypeCatalog};

struct A(Arc<B>, Arc<C>);
struct B(i64);
struct C(Arc<CA>);
struct CA(Arc<CAA>);
struct CAA(Arc<CAAA>);
struct CAAA;

fn named(name: &str) -> Parameter {
    Parameter::new(name.to_lowercase()).with_type(ParameterType::named(name))
}

fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .class(Class::new("CAAA", |_: &Arguments| Ok(CAAA)))
        .class(Class::new("CAA", |arguments: &Arguments| Ok(CAA(arguments.get(0)?))).with_constructor([named("CAAA")]))
        .class(Class::new("CA", |arguments: &Arguments| Ok(CA(arguments.get(0)?))).with_constructor([named("CAA")]))
        .class(Class::new("C", |arguments: &Arguments| Ok(C(arguments.get(0)?))).with_constructor([named("CA")]))
        .class(
            Class::new("B", |arguments: &Arguments| Ok(B(arguments.cloned(0)?)))
                .with_constructor([Parameter::new("num").with_type(ParameterType::builtin("int"))]),
        )
        .class(
            Class::new("A", |arguments: &Arguments| Ok(A(arguments.get(0)?, arguments.get(1)?)))
                .with_constructor([named("B"), named("C")]),
        )
}

#[inline]
fn container_with_factories(flags: Flags) -> Container {
    let container = Container::new(flags, TypeCatalog::new());
    container
        .register_factory("CAAA", |_: &Container| Ok(CAAA))
        .unwrap()
        .register_factory("CAA", |container: &Container| Ok(CAA(container.get_as("CAAA")?)))
        .unwrap()
        .register_factory("CA", |container: &Container| Ok(CA(container.get_as("CAA")?)))
        .unwrap()
        .register_factory("C", |container: &Container| Ok(C(container.get_as("CA")?)))
        .unwrap()
        .register_factory("B", |_: &Container| Ok(B(2)))
        .unwrap()
        .register_factory("A", |container: &Container| Ok(A(container.get_as("B")?, container.get_as("C")?)))
        .unwrap();
    container
}

#[inline]
fn container_autowired(flags: Flags) -> Container {
    let container = Container::new(flags, catalog());
    container.register_value("num", 2i64).unwrap();
    container
}

#[inline]
fn container_get(container: &Container) {
    let _ = container.get_as::<A>("A").unwrap();
}

fn criterion_benchmark(c: &mut Criterion) {
    let container_1 = container_with_factories(Flags::empty());
    let container_2 = container_with_factories(Flags::CACHE_MODE);
    let container_3 = container_autowired(Flags::EXTRA_LAZY_BINDING);

    c.bench_function("container_new_with_factories", |b| {
        b.iter(|| container_with_factories(Flags::default()))
    })
    .bench_function("container_get", |b| b.iter(|| container_get(&container_1)))
    .bench_function("container_get_with_cache", |b| b.iter(|| container_get(&container_2)))
    .bench_function("container_get_autowired", |b| b.iter(|| container_get(&container_3)))
    .bench_function("container_get_after_refresh", |b| {
        b.iter(|| {
            container_2.refresh(["A", "C"]);
            container_get(&container_2);
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
