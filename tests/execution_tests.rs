//! End-to-end query execution through `ExecutionContext`.


use quarry::quarry_operators::Operator;
use quarry::{
    cast, col, col_index, lit_double, lit_long, lit_str, max, min, not, sum, EngineConfig, Error,
    ExecError, ExecutionContext, PrimitiveType, Value,
};
use test_data_gen::{employee_context, render};

fn batch_size(n: usize) -> EngineConfig {
    EngineConfig {
        batch_size: n,
        ..EngineConfig::default()
    }
}

#[test]
fn test_selection_then_projection() {
    let ctx = employee_context(EngineConfig::default());
    let df = ctx
        .table("employee")
        .unwrap()
        .filter(col("state").eq(lit_str("CO")))
        .project(vec![col("id"), col("first_name"), col("last_name")]);
    let batches = ctx.collect(&df).unwrap();
    assert_eq!(render(&batches), "2,Gregg,Langford\n3,John,Travis\n5,Ana,Ortiz\n");
    assert_eq!(batches[0].schema.fields[1].name, "first_name");
}

#[test]
fn test_aggregate_groups_in_first_seen_order() {
    for size in [1, 4, 1024] {
        let ctx = employee_context(batch_size(size));
        let df = ctx.table("employee").unwrap().aggregate(
            vec![col("state")],
            vec![min(col("salary")), max(col("salary")), sum(col("salary"))],
        );
        let batches = ctx.collect(&df).unwrap();
        assert_eq!(batches.len(), 1, "batch size {size}");
        assert_eq!(
            render(&batches),
            "CA,12000,13000,25000\nCO,9500,11500,31000\nnull,11500,11500,11500\n"
        );
        assert_eq!(
            batches[0].schema.to_string(),
            "[state: utf8, MIN(#salary): int64, MAX(#salary): int64, SUM(#salary): int64]"
        );
    }
}

#[test]
fn test_selection_preserves_row_order_across_batches() {
    let ctx = employee_context(batch_size(2));
    let df = ctx
        .table("employee")
        .unwrap()
        .filter(col("salary").gt(lit_long(11000)))
        .project(vec![col("id")]);
    let batches = ctx.collect(&df).unwrap();
    let sizes: Vec<_> = batches.iter().map(|b| b.row_count()).collect();
    assert_eq!(sizes, vec![1, 2, 1]);
    assert_eq!(render(&batches), "1\n3\n4\n6\n");
}

#[test]
fn test_hash_aggregate_yields_exactly_one_batch() {
    let ctx = employee_context(batch_size(2));
    let df = ctx
        .table("employee")
        .unwrap()
        .aggregate(vec![col("job_title")], vec![max(col("salary"))]);
    let plan = ctx.optimized_plan(&df).unwrap();
    let mut physical = ctx.create_physical_plan(&plan).unwrap();

    assert!(physical.next().unwrap());
    let batch = physical.execute().unwrap();
    assert_eq!(batch.row_count(), 4);
    assert!(!physical.next().unwrap());
    assert!(!physical.next().unwrap());
    assert!(matches!(physical.execute(), Err(Error::Invariant(_))));
}

#[test]
fn test_limit_truncates_last_batch() {
    let ctx = employee_context(batch_size(3));
    let df = ctx
        .table("employee")
        .unwrap()
        .project(vec![col("id")])
        .limit(4);
    let batches = ctx.collect(&df).unwrap();
    let sizes: Vec<_> = batches.iter().map(|b| b.row_count()).collect();
    assert_eq!(sizes, vec![3, 1]);
    assert_eq!(render(&batches), "1\n2\n3\n4\n");
}

#[test]
fn test_cast_and_arithmetic_in_projection() {
    let ctx = employee_context(EngineConfig::default());
    let df = ctx
        .table("employee")
        .unwrap()
        .filter(col("id").lt_eq(lit_long(2)))
        .project(vec![
            cast(col("id"), PrimitiveType::Utf8).alias("id_text"),
            col("salary").add(lit_long(500)).alias("raised"),
            cast(col("salary"), PrimitiveType::Int32),
        ]);
    let schema = df.schema().unwrap();
    assert_eq!(
        schema.to_string(),
        "[id_text: utf8, raised: int64, salary: int32]"
    );

    let batches = ctx.collect(&df).unwrap();
    assert_eq!(render(&batches), "1,12500,12000\n2,10500,10000\n");
    assert_eq!(
        batches[0].fields[2].get_value(0).unwrap(),
        Some(Value::Int32(12000))
    );
}

#[test]
fn test_not_and_modulus_filters() {
    let ctx = employee_context(EngineConfig::default());

    let not_co = ctx
        .table("employee")
        .unwrap()
        .filter(not(col("state").eq(lit_str("CO"))))
        .project(vec![col("id")]);
    assert_eq!(render(&ctx.collect(&not_co).unwrap()), "1\n6\n");

    let even = ctx
        .table("employee")
        .unwrap()
        .filter(col("id").modulus(lit_long(2)).eq(lit_long(0)))
        .project(vec![col("id")]);
    assert_eq!(render(&ctx.collect(&even).unwrap()), "2\n4\n6\n");
}

#[test]
fn test_mixed_operand_types_fail() {
    let ctx = employee_context(EngineConfig::default());
    let df = ctx
        .table("employee")
        .unwrap()
        .filter(col("salary").gt(lit_double(1.0)));
    assert!(matches!(
        ctx.collect(&df),
        Err(ExecError::Core(Error::TypeMismatch { .. }))
    ));
}

#[test]
fn test_sum_over_text_fails() {
    let ctx = employee_context(EngineConfig::default());
    let df = ctx
        .table("employee")
        .unwrap()
        .aggregate(vec![], vec![sum(col("last_name"))]);
    assert!(matches!(
        ctx.collect(&df),
        Err(ExecError::Core(Error::TypeMismatch { .. }))
    ));
}

#[test]
fn test_global_aggregate_without_groups() {
    let ctx = employee_context(batch_size(4));
    let df = ctx
        .table("employee")
        .unwrap()
        .aggregate(vec![], vec![sum(col("salary")), min(col("id"))]);
    assert_eq!(render(&ctx.collect(&df).unwrap()), "67500,1\n");
}

#[test]
fn test_manifest_counts_output() {
    let ctx = employee_context(batch_size(4));
    let df = ctx
        .table("employee")
        .unwrap()
        .filter(col("state").eq(lit_str("CO")));
    let out = ctx.execute(&df).unwrap();
    assert_eq!(out.row_count(), 3);
    assert_eq!(out.manifest.output_rows, 3);
    assert_eq!(out.manifest.output_batches, 2);

    let json = out.manifest.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["output_rows"], 3);
    assert!(value["plan_hash"].is_array());
}

#[test]
fn test_positional_references_survive_optimization() {
    let plain = employee_context(EngineConfig {
        optimize: false,
        ..EngineConfig::default()
    });
    let optimized = employee_context(EngineConfig::default());

    let swapped = |ctx: &ExecutionContext| {
        let df = ctx
            .table("employee")
            .unwrap()
            .project(vec![col_index(1), col_index(0)]);
        render(&ctx.collect(&df).unwrap())
    };
    let expected = "Bill,1\nGregg,2\nJohn,3\nVon,4\nAna,5\nMei,6\n";
    assert_eq!(swapped(&plain), expected);
    assert_eq!(swapped(&optimized), expected);

    let filtered = |ctx: &ExecutionContext| {
        let df = ctx
            .table("employee")
            .unwrap()
            .filter(col_index(5).gt(lit_long(11000)))
            .project(vec![col("id")]);
        render(&ctx.collect(&df).unwrap())
    };
    assert_eq!(filtered(&plain), "1\n3\n4\n6\n");
    assert_eq!(filtered(&optimized), "1\n3\n4\n6\n");
}
