//! Integration tests for the mass client
//!
//! These tests drive the client against simulated ports and verify:
//! - Discovery, including the probing fallback
//! - Explicit and implicit mass open/close
//! - Batch read/write selection rules and the name-set invariant
//! - Per-port faults staying per-port

use std::collections::BTreeSet;
use std::time::Duration;

use lifi_mass::{MassClient, MassError};
use lifi_port::{Discovery, PortError, PortSettings, ProbeScheme};
use lifi_sim::{SimBehavior, SimDriver, SimEndpointConfig, SimOpenError};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    pub fn fast_settings() -> PortSettings {
        PortSettings::new(9600, Duration::from_millis(50))
    }

    pub fn client(driver: SimDriver) -> MassClient<SimDriver> {
        MassClient::new(driver, fast_settings())
    }

    pub fn echo_driver(names: &[&str]) -> SimDriver {
        names.iter().fold(SimDriver::new(), |driver, name| {
            driver.with_endpoint(*name, SimBehavior::Echo)
        })
    }

    pub fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }
}

// ============================================================================
// Open/Close Tests
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_open_all_discovers_every_endpoint() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1", "SIM2", "SIM3"]));

        let opened = client.mass_open(None).await;

        assert_eq!(opened.len(), 3);
        assert_eq!(client.port_names(), vec!["SIM1", "SIM2", "SIM3"]);
    }

    #[tokio::test]
    async fn test_explicit_open_adds_only_requested_names() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1", "SIM2", "SIM3"]));

        let opened = client.mass_open(Some(&helpers::names(&["SIM2"]))).await;

        assert_eq!(opened.names().collect::<Vec<_>>(), vec!["SIM2"]);
        assert_eq!(client.port_names(), vec!["SIM2"]);
    }

    #[tokio::test]
    async fn test_explicit_open_keeps_other_tracked_ports() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1", "SIM2"]));
        client.mass_open(Some(&helpers::names(&["SIM1"]))).await;

        client.mass_open(Some(&helpers::names(&["SIM2"]))).await;

        assert_eq!(client.port_names(), vec!["SIM1", "SIM2"]);
    }

    #[tokio::test]
    async fn test_reopen_replaces_handle() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1"]));
        client.mass_open(None).await;

        client.mass_open(Some(&helpers::names(&["SIM1", "SIM1"]))).await;

        assert_eq!(client.port_names(), vec!["SIM1"]);
        assert_eq!(client.driver().record("SIM1").unwrap().opens, 2);
    }

    #[tokio::test]
    async fn test_failed_opens_are_absent() {
        let mut driver = helpers::echo_driver(&["SIM1"]);
        let mut busy = SimEndpointConfig::new("SIM2", SimBehavior::Echo);
        busy.open_error = Some(SimOpenError::Busy);
        driver.add(busy);
        let mut client = helpers::client(driver);

        let opened = client
            .mass_open(Some(&helpers::names(&["SIM1", "SIM2", "NOPE"])))
            .await;

        assert_eq!(client.port_names(), vec!["SIM1"]);
        assert_eq!(opened.get("SIM2"), Some(&Err(PortError::Busy("SIM2".into()))));
        assert_eq!(
            opened.get("NOPE"),
            Some(&Err(PortError::NotFound("NOPE".into())))
        );
        assert_eq!(opened.failures().count(), 2);
        // Failed entries are reported, never tracked
        for (name, _) in opened.failures() {
            assert!(!client.ports().contains(name));
            assert!(client.get_port(name).is_none());
        }
    }

    #[tokio::test]
    async fn test_canonical_name_is_tracked() {
        let mut driver = SimDriver::new();
        let mut aliased = SimEndpointConfig::new("ALIAS", SimBehavior::Echo);
        aliased.canonical_name = Some("COM7".to_string());
        driver.add(aliased);
        let mut client = helpers::client(driver);

        let opened = client.mass_open(None).await;

        assert_eq!(opened.get("ALIAS"), Some(&Ok("COM7".to_string())));
        assert_eq!(client.port_names(), vec!["COM7"]);
        assert!(client.get_port("COM7").is_some());
        assert!(client.get_port("ALIAS").is_none());
    }

    #[tokio::test]
    async fn test_probe_fallback_without_enumeration() {
        let driver = helpers::echo_driver(&["SIM1", "SIM2"]).with_enumeration(false);
        let discovery = Discovery {
            probe: ProbeScheme {
                prefix: "SIM".to_string(),
                first: 1,
                count: 4,
            },
            ..Default::default()
        };
        let mut client = helpers::client(driver).with_discovery(discovery);

        let opened = client.mass_open(None).await;

        assert_eq!(opened.len(), 4);
        assert_eq!(client.port_names(), vec!["SIM1", "SIM2"]);
    }

    #[tokio::test]
    async fn test_open_all_starts_over() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1", "SIM2"]));
        client.mass_open(None).await;

        client.mass_open(None).await;

        assert_eq!(client.port_names(), vec!["SIM1", "SIM2"]);
        assert_eq!(client.driver().record("SIM2").unwrap().opens, 2);
    }

    #[tokio::test]
    async fn test_mass_close() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1", "SIM2", "SIM3"]));
        client.mass_open(None).await;

        client
            .mass_close(Some(&helpers::names(&["SIM2", "NOPE"])))
            .await;
        assert_eq!(client.port_names(), vec!["SIM1", "SIM3"]);

        client.mass_close(Some(&[])).await;
        assert_eq!(client.ports().len(), 2);

        client.mass_close(None).await;
        assert!(client.ports().is_empty());
    }

    #[tokio::test]
    async fn test_single_port_operations() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1"]));

        assert_eq!(client.open("SIM1").await, Ok("SIM1".to_string()));
        assert_eq!(client.write("SIM1", b"ok").await, Ok(2));
        assert_eq!(client.read("SIM1", 2).await, Ok(b"ok".to_vec()));

        assert!(client.close("SIM1").await);
        assert!(!client.close("SIM1").await);
        assert_eq!(
            client.read("SIM1", 1).await,
            Err(PortError::NotTracked("SIM1".into()))
        );
    }
}

// ============================================================================
// Batch I/O Tests
// ============================================================================

mod io_tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read_all() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1", "SIM2"]));
        client.mass_open(None).await;

        let written = client.mass_write(b"hi", None).await.unwrap();
        assert_eq!(written.successes().count(), 2);
        assert!(written.iter().all(|(_, r)| r == &Ok(2)));

        let read = client.mass_read(2, None).await.unwrap();
        assert_eq!(read.get("SIM1"), Some(&Ok(b"hi".to_vec())));
        assert_eq!(read.get("SIM2"), Some(&Ok(b"hi".to_vec())));
        assert_eq!(client.driver().received("SIM2"), b"hi");
    }

    #[tokio::test]
    async fn test_read_available() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1"]));
        client.mass_open(None).await;
        client.mass_write(b"abc", None).await.unwrap();

        let read = client.mass_read(0, None).await.unwrap();

        assert_eq!(read.get("SIM1"), Some(&Ok(b"abc".to_vec())));
    }

    #[tokio::test]
    async fn test_clear_input_discards_leftover_replies() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1"]));
        client.mass_open(None).await;
        client.mass_write(b"17", None).await.unwrap();
        let first = client.mass_read(1, None).await.unwrap();
        assert_eq!(first.get("SIM1"), Some(&Ok(b"1".to_vec())));

        let cleared = client.mass_clear_input(None).await.unwrap();
        assert_eq!(cleared.get("SIM1"), Some(&Ok(1)));

        client.mass_write(b"3", None).await.unwrap();
        let second = client.mass_read(1, None).await.unwrap();
        assert_eq!(second.get("SIM1"), Some(&Ok(b"3".to_vec())));
    }

    #[tokio::test]
    async fn test_clear_input_with_nothing_waiting() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1", "SIM2"]));
        client.mass_open(None).await;

        let cleared = client.mass_clear_input(None).await.unwrap();

        assert!(cleared.iter().all(|(_, r)| r == &Ok(0)));
        assert_eq!(
            client.mass_clear_input(Some(&helpers::names(&["GONE"]))).await.unwrap_err(),
            MassError::NoPorts
        );
    }

    #[tokio::test]
    async fn test_empty_list_means_every_tracked_port() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1", "SIM2"]));
        client.mass_open(None).await;

        let written = client.mass_write(b"x", Some(&[])).await.unwrap();

        assert_eq!(written.names().collect::<Vec<_>>().len(), 2);
    }

    #[tokio::test]
    async fn test_no_ports() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1"]));

        assert_eq!(
            client.mass_read(1, Some(&[])).await.unwrap_err(),
            MassError::NoPorts
        );
        assert_eq!(
            client.mass_write(b"x", None).await.unwrap_err(),
            MassError::NoPorts
        );
        assert_eq!(client.driver().record("SIM1").unwrap().opens, 0);

        client.mass_open(None).await;
        assert!(client.mass_write(b"x", Some(&[])).await.is_ok());
    }

    #[tokio::test]
    async fn test_untracked_names_are_reported() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1"]));
        client.mass_open(None).await;

        let written = client
            .mass_write(b"x", Some(&helpers::names(&["SIM1", "GONE"])))
            .await
            .unwrap();

        assert_eq!(written.get("SIM1"), Some(&Ok(1)));
        assert_eq!(
            written.get("GONE"),
            Some(&Err(PortError::NotTracked("GONE".into())))
        );
    }

    #[tokio::test]
    async fn test_only_untracked_names_is_no_ports() {
        let mut client = helpers::client(helpers::echo_driver(&["SIM1"]));
        client.mass_open(None).await;

        let result = client
            .mass_read(1, Some(&helpers::names(&["GONE"])))
            .await;

        assert_eq!(result.unwrap_err(), MassError::NoPorts);
    }

    #[tokio::test]
    async fn test_silent_port_times_out_alone() {
        let driver = helpers::echo_driver(&["SIM1"]).with_endpoint("SIM2", SimBehavior::Silent);
        let mut client = helpers::client(driver);
        client.mass_open(None).await;
        client.mass_write(b"e", None).await.unwrap();

        let read = client.mass_read(1, None).await.unwrap();

        assert_eq!(read.get("SIM1"), Some(&Ok(b"e".to_vec())));
        assert!(matches!(
            read.get("SIM2"),
            Some(Err(PortError::Timeout { op: "read", .. }))
        ));
        // A timed-out port stays open
        assert_eq!(client.port_names(), vec!["SIM1", "SIM2"]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    const POOL: [&str; 5] = ["SIM1", "SIM2", "SIM3", "SIM4", "SIM5"];

    fn requested() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop::sample::select(POOL.to_vec()), 1..8)
            .prop_map(|names| names.into_iter().map(String::from).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn batch_names_match_request(
            open in prop::sample::subsequence(POOL.to_vec(), 1..=POOL.len()),
            request in requested(),
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (names, tracked) = rt.block_on(async {
                let mut client = helpers::client(helpers::echo_driver(&POOL));
                let open: Vec<String> = open.iter().map(|n| n.to_string()).collect();
                client.mass_open(Some(&open)).await;

                let written = client.mass_write(b"e", Some(&request)).await;
                let names: Option<BTreeSet<String>> = written
                    .ok()
                    .map(|batch| batch.names().map(String::from).collect());
                let tracked = client.port_names();
                client.mass_close(None).await;
                (names, tracked)
            });

            let expected: BTreeSet<String> = request.iter().cloned().collect();
            let any_tracked = request.iter().any(|n| open.contains(&n.as_str()));

            match names {
                Some(names) => {
                    prop_assert!(any_tracked);
                    prop_assert_eq!(names, expected);
                }
                None => prop_assert!(!any_tracked),
            }
            prop_assert_eq!(tracked.len(), open.len());
        }
    }
}
