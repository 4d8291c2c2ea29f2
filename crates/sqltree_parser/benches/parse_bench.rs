use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sqltree_core::{ArenaContext, MemoryScope};
use sqltree_options::ParseOptions;
use sqltree_parser::{RawParser, SqlParser};

// A reporting query with most of the clause and expression forms
const REPORT_QUERY: &str = r#"
WITH recent AS MATERIALIZED (
    SELECT o.id, o.customer_id, o.total, o.created_at
    FROM orders o
    WHERE o.created_at >= current_date - interval '30 days'
      AND o.status NOT IN ('cancelled', 'refunded')
),
ranked AS (
    SELECT r.*, row_number() OVER (PARTITION BY r.customer_id ORDER BY r.total DESC) AS rn
    FROM recent r
)
SELECT c.id,
       c.name,
       coalesce(sum(r.total) FILTER (WHERE r.rn <= 3), 0) AS top_three,
       count(*) AS orders,
       CASE WHEN count(*) > 10 THEN 'frequent' ELSE 'occasional' END AS segment,
       extract(year FROM min(r.created_at)) AS first_year
FROM customers c
LEFT JOIN ranked r ON r.customer_id = c.id
WHERE c.region = ANY (ARRAY['north', 'east'])
  AND EXISTS (SELECT 1 FROM addresses a WHERE a.customer_id = c.id AND a.verified)
GROUP BY c.id, c.name
HAVING sum(r.total) > 100.50
ORDER BY top_three DESC NULLS LAST, c.name
LIMIT 50 OFFSET 10;

UPDATE customers SET (tier, updated_at) = ('gold', now())
WHERE id IN (SELECT customer_id FROM ranked WHERE rn = 1)
RETURNING id, tier;
"#;

fn bench_parse_report(c: &mut Criterion) {
    c.bench_function("parse_report_query", |b| {
        b.iter(|| {
            let scope = MemoryScope::new("bench");
            let arena = ArenaContext::new(&scope);
            let stmts = SqlParser.parse(black_box(REPORT_QUERY), &ParseOptions::default(), &arena);
            black_box(stmts.map(|stmts| stmts.len()).ok());
        });
    });
}

fn bench_parse_deep_expression(c: &mut Criterion) {
    let sql = format!("SELECT {}", (0..400).map(|i| format!("c{i}")).collect::<Vec<_>>().join(" + "));
    c.bench_function("parse_long_operator_chain", |b| {
        b.iter(|| {
            let scope = MemoryScope::new("bench");
            let arena = ArenaContext::new(&scope);
            let stmts = SqlParser.parse(black_box(&sql), &ParseOptions::default(), &arena);
            black_box(stmts.map(|stmts| stmts.len()).ok());
        });
    });
}

criterion_group!(benches, bench_parse_report, bench_parse_deep_expression);
criterion_main!(benches);
