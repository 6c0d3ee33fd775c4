//! Property tests for the codec, market state and order ledger.

use proptest::prelude::*;

use trader::codec::{decode, encode};
use trader::ledger::OrderLedger;
use trader::market_state::MarketState;
use trader::messages::{ClientMessage, ServerMessage, SymbolPosition};
use types::ids::{OrderId, OrderIdSequence, Symbol};
use types::numeric::Level;
use types::order::Side;

fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::BUY), Just(Side::SELL)]
}

fn symbol() -> impl Strategy<Value = Symbol> {
    prop_oneof![
        Just(Symbol::new("BOND")),
        Just(Symbol::new("VALBZ")),
        Just(Symbol::new("VALE")),
        Just(Symbol::new("XLF")),
    ]
}

/// Ids can only come from a sequence, so draw an index and advance to it.
fn order_id() -> impl Strategy<Value = OrderId> {
    (1u64..500).prop_map(|n| {
        let mut ids = OrderIdSequence::new();
        let mut id = ids.next_id();
        for _ in 1..n {
            id = ids.next_id();
        }
        id
    })
}

fn client_message() -> impl Strategy<Value = ClientMessage> {
    prop_oneof![
        "[A-Z]{1,12}".prop_map(|team| ClientMessage::Hello { team }),
        (order_id(), symbol(), side(), -10_000i64..10_000, 1u64..1_000).prop_map(
            |(order_id, symbol, side, price, size)| ClientMessage::Add {
                order_id,
                symbol,
                side,
                price,
                size,
            }
        ),
        order_id().prop_map(|order_id| ClientMessage::Cancel { order_id }),
        (order_id(), symbol(), side(), 1u64..1_000).prop_map(|(order_id, symbol, side, size)| {
            ClientMessage::Convert {
                order_id,
                symbol,
                side,
                size,
            }
        }),
    ]
}

fn levels() -> impl Strategy<Value = Vec<Level>> {
    prop::collection::vec(
        (-10_000i64..10_000, 0u64..1_000).prop_map(|(price, size)| Level::new(price, size)),
        0..6,
    )
}

fn symbols() -> impl Strategy<Value = Vec<Symbol>> {
    prop::collection::vec(symbol(), 0..4)
}

fn reason() -> impl Strategy<Value = String> {
    "[A-Za-z_ :]{0,24}"
}

fn server_message() -> impl Strategy<Value = ServerMessage> {
    prop_oneof![
        prop::collection::vec(
            (symbol(), -1_000i64..1_000).prop_map(|(symbol, position)| SymbolPosition { symbol, position }),
            0..4,
        )
        .prop_map(|symbols| ServerMessage::Hello { symbols }),
        symbols().prop_map(|symbols| ServerMessage::Open { symbols }),
        symbols().prop_map(|symbols| ServerMessage::Close { symbols }),
        reason().prop_map(|error| ServerMessage::Error { error }),
        (symbol(), levels(), levels()).prop_map(|(symbol, buy, sell)| ServerMessage::Book { symbol, buy, sell }),
        (symbol(), -10_000i64..10_000, 1u64..1_000)
            .prop_map(|(symbol, price, size)| ServerMessage::Trade { symbol, price, size }),
        order_id().prop_map(|order_id| ServerMessage::Ack { order_id }),
        (order_id(), reason()).prop_map(|(order_id, error)| ServerMessage::Reject { order_id, error }),
        (order_id(), symbol(), side(), -10_000i64..10_000, 1u64..1_000).prop_map(
            |(order_id, symbol, side, price, size)| ServerMessage::Fill {
                order_id,
                symbol,
                side,
                price,
                size,
            }
        ),
        order_id().prop_map(|order_id| ServerMessage::Out { order_id }),
    ]
}

/// Either a fill on BOND or a book update on some other symbol.
#[derive(Debug, Clone)]
enum Event {
    Fill(Side, u64),
    Book(Symbol, i64),
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (side(), 1u64..100).prop_map(|(side, size)| Event::Fill(side, size)),
        (
            prop_oneof![Just(Symbol::new("VALBZ")), Just(Symbol::new("VALE"))],
            1i64..5_000
        )
            .prop_map(|(symbol, price)| Event::Book(symbol, price)),
    ]
}

proptest! {
    /// Every client message survives encode then decode unchanged, as one line.
    #[test]
    fn fuzz_client_message_codec(message in client_message()) {
        let line = encode(&message).unwrap();
        prop_assert!(line.ends_with('\n'));
        prop_assert_eq!(line.matches('\n').count(), 1);
        prop_assert!(!line.contains(' '));

        let decoded: ClientMessage = decode(&line).unwrap();
        prop_assert_eq!(decoded, message);
    }

    /// Every exchange message survives encode then decode unchanged.
    #[test]
    fn fuzz_server_message_codec(message in server_message()) {
        let line = encode(&message).unwrap();
        prop_assert_eq!(line.matches('\n').count(), 1);

        let decoded: ServerMessage = decode(&line).unwrap();
        prop_assert_eq!(&decoded, &message);
        prop_assert_eq!(decoded.kind(), message.kind());
    }

    /// Position is the signed sum of fills, whatever else arrives in between.
    #[test]
    fn fuzz_position_is_signed_fill_sum(events in prop::collection::vec(event(), 0..60)) {
        let mut market = MarketState::new();
        let bond = Symbol::new("BOND");
        let mut expected = 0i64;

        for event in &events {
            match event {
                Event::Fill(side, size) => {
                    market.apply_fill(&bond, *side, *size).unwrap();
                    expected += side.sign() * *size as i64;
                }
                Event::Book(symbol, price) => {
                    let message = ServerMessage::Book {
                        symbol: symbol.clone(),
                        buy: vec![Level::new(*price, 1)],
                        sell: vec![Level::new(*price + 1, 1)],
                    };
                    market.apply(&message).unwrap();
                }
            }
        }

        prop_assert_eq!(market.position("BOND"), expected);
    }

    /// Issued ids strictly increase even with fills and rejects interleaved.
    #[test]
    fn fuzz_next_id_strictly_increasing(
        steps in prop::collection::vec((side(), 0u8..3, 1u64..10), 1..50),
    ) {
        let mut ledger = OrderLedger::new();
        let mut issued: Vec<OrderId> = Vec::new();

        for (side, action, size) in &steps {
            let order_id = ledger.next_id();
            ledger
                .record_submission(order_id, Symbol::new("BOND"), *side, Some(1000), *size)
                .unwrap();
            match action {
                0 => ledger.record_fill(order_id, *size),
                1 => ledger.record_reject(order_id, "REJECTED"),
                _ => {}
            }
            issued.push(order_id);
        }

        for pair in issued.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        prop_assert_eq!(ledger.order_count(), steps.len());
    }
}

#[test]
fn test_bad_direction_rejected() {
    let line = r#"{"type":"add","order_id":1,"symbol":"BOND","dir":"HOLD","price":1,"size":1}"#;
    assert!(decode::<ClientMessage>(line).is_err());
}

#[test]
fn test_missing_required_field_rejected() {
    let line = r#"{"type":"fill","order_id":1,"symbol":"BOND","dir":"BUY","size":1}"#;
    assert!(decode::<ServerMessage>(line).is_err());
}
