extern crate criterion;

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, Criterion};

use blockform_lib::error::{FormError, Result};
use blockform_lib::fetch::{FetchRequest, FetchResponse, Fetcher};
use blockform_lib::form_builder::FormBuilder;
use blockform_lib::parser::block_html::parse_block;
use blockform_lib::payload::generate_payload;
use blockform_lib::FormConfig;

/// Serves one schema sheet from memory.
struct SheetFetcher {
    sheet: String,
}

#[async_trait(?Send)]
impl Fetcher for SheetFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        if request.url == "/forms/large.json" {
            Ok(FetchResponse {
                status: 200,
                body: self.sheet.clone(),
            })
        } else {
            Err(FormError::Fetch {
                url: request.url,
                message: "not found".to_string(),
            })
        }
    }
}

fn large_sheet(rows: usize) -> String {
    let types = ["text", "email", "number", "select", "checkbox", "radio", "text-area"];
    let data: Vec<String> = (0..rows)
        .map(|i| {
            format!(
                r#"{{"Type":"{}","Name":"field{}","Label":"Field {}","Options":"One, Two, Three","Fieldset":"group{}"}}"#,
                types[i % types.len()],
                i % 50,
                i,
                i % 5
            )
        })
        .chain((0..5).map(|g| format!(r#"{{"Type":"fieldset","Name":"group{}"}}"#, g)))
        .collect();
    format!(r#"{{"data":[{}]}}"#, data.join(","))
}

fn bench_build_form(c: &mut Criterion) {
    let fetcher = SheetFetcher {
        sheet: large_sheet(1_000),
    };
    let config = FormConfig::default();

    c.bench_function("build_large_form", |b| {
        b.iter(|| {
            futures::executor::block_on(
                FormBuilder::new(&fetcher, &config).create_form("/forms/large.json", "/submit.json"),
            )
        })
    });

    let form = futures::executor::block_on(
        FormBuilder::new(&fetcher, &config).create_form("/forms/large.json", "/submit.json"),
    );
    if let Ok(form) = form {
        c.bench_function("generate_payload", |b| b.iter(|| generate_payload(&form)));
    }
}

fn bench_parse_block(c: &mut Criterion) {
    let mut rows = String::with_capacity(1_000_000);
    rows.push_str(r#"<div class="customform">"#);
    for _ in 0..10_000 {
        rows.push_str(r#"<div><div><p><a href="/forms/contact" title="/forms/contact">Contact</a></p></div></div>"#);
    }
    rows.push_str("</div>");

    c.bench_function("parse_block", |b| b.iter(|| parse_block(&rows)));
}

criterion_group!(benches, bench_build_form, bench_parse_block);
criterion_main!(benches);
