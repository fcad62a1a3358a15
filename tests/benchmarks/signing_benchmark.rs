//! Benchmarks for request canonicalization and signing
//!
//! Both run once per private request, ahead of any network I/O.

use coinbridge_core::MonotonicNonce;
use coinbridge_exchanges::bittrex::BittrexSigner;
use coinbridge_exchanges::poloniex::PoloniexSigner;
use coinbridge_exchanges::{canonicalize, hmac_sha512_hex, Credentials, RequestParams};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn order_params() -> RequestParams {
    RequestParams::new()
        .with("currencyPair", "BTC_LTC")
        .with("rate", "0.01845000")
        .with("amount", "12.5")
        .with("address", "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2")
}

fn bench_canonicalize(c: &mut Criterion) {
    let params = order_params();
    c.bench_function("canonicalize_4_params", |b| {
        b.iter(|| canonicalize(black_box(&params)))
    });
}

fn bench_hmac(c: &mut Criterion) {
    let payload = canonicalize(&order_params());
    c.bench_function("hmac_sha512_hex", |b| {
        b.iter(|| hmac_sha512_hex(black_box("secret"), black_box(&payload)))
    });
}

fn bench_signers(c: &mut Criterion) {
    let nonce = MonotonicNonce::new();
    let bittrex = BittrexSigner::new(Some(Credentials::new("key", "secret")));
    let poloniex = PoloniexSigner::new(Some(Credentials::new("key", "secret")));

    c.bench_function("bittrex_sign_request", |b| {
        b.iter(|| {
            bittrex.sign_request(
                "https://bittrex.com/api/v1.1/market/selllimit?",
                order_params(),
                &nonce,
            )
        })
    });

    c.bench_function("poloniex_sign_request", |b| {
        b.iter(|| poloniex.sign_request("https://poloniex.com/tradingApi", "sell", order_params(), &nonce))
    });
}

criterion_group!(benches, bench_canonicalize, bench_hmac, bench_signers);
criterion_main!(benches);
