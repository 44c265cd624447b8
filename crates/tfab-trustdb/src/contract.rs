//! Contract test suite for trust database implementations.
//!
//! The suite is written once against [`VersionedStore`] and [`TrustDb`];
//! every backend should run all of it against a fresh, empty instance per
//! function. The generic functions take the objects to exercise so they can
//! be instantiated for each object family; the `TrustDb`-level scenarios
//! build their own fixtures.
//!
//! # Usage
//!
//! ```no_run
//! use tfab_trustdb::{contract, InMemoryTrustDb};
//!
//! #[tokio::test]
//! async fn trc_scenario() {
//!     contract::trc_scenario(&InMemoryTrustDb::new()).await;
//! }
//! ```

use std::fmt::Debug;

use tokio_util::sync::CancellationToken;

use tfab_types::{Isd, IsdAs, Version, Versioned};

use crate::ctx::OpCtx;
use crate::error::TrustDbError;
use crate::traits::{TrustDb, VersionedStore};

/// Test fixtures: structurally valid trust objects with fabricated key and
/// signature bytes.
pub mod fixtures {
    use tfab_types::{Certificate, Chain, Isd, IssuerCert, LeafCert, Trc, Validity};

    pub fn trc(isd: u16, version: u64) -> Trc {
        Trc {
            isd: Isd(isd),
            version,
            description: format!("ISD {isd} root v{version}"),
            validity: Validity {
                not_before: 1_000,
                not_after: 2_000,
            },
            core_ases: vec![format!("{isd}-ff00:0:110").parse().unwrap()],
            signature: vec![0xaa; 64],
        }
    }

    pub fn certificate(subject: &str, version: u64, issuer: &str, issuer_version: u64) -> Certificate {
        Certificate {
            subject: subject.parse().unwrap(),
            version,
            issuer: issuer.parse().unwrap(),
            issuer_version,
            validity: Validity {
                not_before: 1_000,
                not_after: 2_000,
            },
            subject_key: vec![0x01; 32],
            signature: vec![0x02; 64],
        }
    }

    pub fn issuer_cert(subject: &str, version: u64) -> IssuerCert {
        IssuerCert(certificate(subject, version, "1-ff00:0:110", 1))
    }

    pub fn leaf_cert(subject: &str, version: u64) -> LeafCert {
        LeafCert(certificate(subject, version, "1-ff00:0:310", 1))
    }

    /// A chain for `ia` whose issuer half is `1-ff00:0:310` v1.
    pub fn chain(ia: &str, version: u64) -> Chain {
        Chain {
            issuer: IssuerCert(certificate("1-ff00:0:310", 1, "1-ff00:0:310", 1)),
            leaf: LeafCert(certificate(ia, version, "1-ff00:0:310", 1)),
        }
    }
}

// ============================================================================
// Generic engine contract — run once per object family
// ============================================================================

/// First insert writes a row, re-insert of the identical object is a
/// no-error no-op.
pub async fn insert_is_idempotent<T, S>(store: &S, object: &T)
where
    T: Versioned + PartialEq + Debug,
    S: VersionedStore<T>,
{
    let ctx = OpCtx::background();
    let affected = store.insert(&ctx, object).await.expect("first insert");
    assert!(affected > 0, "first insert must write a row");
    let affected = store.insert(&ctx, object).await.expect("second insert");
    assert_eq!(affected, 0, "re-insert must be a no-op");
}

/// An inserted object is readable at its exact version.
pub async fn insert_then_get_roundtrips<T, S>(store: &S, object: &T)
where
    T: Versioned + PartialEq + Debug,
    S: VersionedStore<T>,
{
    let ctx = OpCtx::background();
    store.insert(&ctx, object).await.expect("insert");
    let read = store
        .get_version(&ctx, object.owner(), Version::At(object.version()))
        .await
        .expect("get_version");
    assert_eq!(read.as_ref(), Some(object));
}

/// `get_max_version` and the `Latest` sentinel agree, and both return the
/// highest stored version.
pub async fn max_version_equals_latest_sentinel<T, S>(store: &S, low: &T, high: &T)
where
    T: Versioned + PartialEq + Debug,
    S: VersionedStore<T>,
{
    assert_eq!(low.owner(), high.owner(), "fixtures must share an owner");
    assert!(low.version() < high.version());
    let ctx = OpCtx::background();
    store.insert(&ctx, low).await.expect("insert low");
    store.insert(&ctx, high).await.expect("insert high");

    let max = store
        .get_max_version(&ctx, high.owner())
        .await
        .expect("get_max_version");
    let latest = store
        .get_version(&ctx, high.owner(), Version::Latest)
        .await
        .expect("get latest");
    assert_eq!(max.as_ref(), Some(high));
    assert_eq!(latest, max);
}

/// Looking up an owner or version that was never inserted yields `Ok(None)`.
pub async fn absence_is_not_an_error<T, S>(store: &S, absent_owner: T::Owner)
where
    T: Versioned + PartialEq + Debug,
    S: VersionedStore<T>,
{
    let ctx = OpCtx::background();
    let at = store
        .get_version(&ctx, absent_owner.clone(), Version::At(10))
        .await
        .expect("get_version must not error on absence");
    assert_eq!(at, None);
    let latest = store
        .get_version(&ctx, absent_owner.clone(), Version::Latest)
        .await
        .expect("latest must not error on absence");
    assert_eq!(latest, None);
    let max = store
        .get_max_version(&ctx, absent_owner)
        .await
        .expect("get_max_version must not error on absence");
    assert_eq!(max, None);
}

/// `get_all` on an empty store returns an empty sequence without error.
pub async fn get_all_empty_is_empty<T, S>(store: &S)
where
    T: Versioned + PartialEq + Debug,
    S: VersionedStore<T>,
{
    let all = store.get_all(&OpCtx::background()).await.expect("get_all");
    assert!(all.is_empty());
}

/// `get_all` returns objects of distinct owners in insertion order.
pub async fn get_all_preserves_insertion_order<T, S>(store: &S, first: &T, second: &T)
where
    T: Versioned + PartialEq + Debug,
    S: VersionedStore<T>,
{
    assert_ne!(first.owner(), second.owner(), "fixtures must differ in owner");
    let ctx = OpCtx::background();
    store.insert(&ctx, first).await.expect("insert first");
    store.insert(&ctx, second).await.expect("insert second");
    let all = store.get_all(&ctx).await.expect("get_all");
    assert_eq!(all, vec![first.clone(), second.clone()]);
}

/// A fired cancellation token surfaces as [`TrustDbError::Cancelled`], not
/// as an absent result.
pub async fn cancellation_is_distinct_from_absence<T, S>(store: &S, object: &T)
where
    T: Versioned + PartialEq + Debug,
    S: VersionedStore<T>,
{
    store
        .insert(&OpCtx::background(), object)
        .await
        .expect("insert");

    let token = CancellationToken::new();
    token.cancel();
    let ctx = OpCtx::with_cancel(token);

    let err = store
        .get_version(&ctx, object.owner(), Version::At(object.version()))
        .await
        .expect_err("cancelled read must error");
    assert!(matches!(err, TrustDbError::Cancelled), "got {err:?}");

    let err = store
        .insert(&ctx, object)
        .await
        .expect_err("cancelled write must error");
    assert!(matches!(err, TrustDbError::Cancelled), "got {err:?}");
}

// ============================================================================
// TrustDb scenarios — transcribed from the original service contract
// ============================================================================

/// Insert the ISD 1 v1 TRC twice, read it back by exact version, max
/// version, and the latest sentinel; a foreign ISD stays absent.
pub async fn trc_scenario(db: &impl TrustDb) {
    let ctx = OpCtx::background();
    let trc = fixtures::trc(1, 1);

    let affected = db.insert_trc(&ctx, &trc).await.expect("insert");
    assert!(affected > 0);
    let affected = db.insert_trc(&ctx, &trc).await.expect("re-insert");
    assert_eq!(affected, 0);

    let by_version = db
        .get_trc_version(&ctx, Isd(1), Version::At(1))
        .await
        .expect("get version");
    assert_eq!(by_version.as_ref(), Some(&trc));

    let by_max = db.get_trc_max_version(&ctx, Isd(1)).await.expect("get max");
    assert_eq!(by_max.as_ref(), Some(&trc));
    let by_latest = db
        .get_trc_version(&ctx, Isd(1), Version::Latest)
        .await
        .expect("get latest");
    assert_eq!(by_latest, by_max);

    let missing = db
        .get_trc_version(&ctx, Isd(2), Version::At(10))
        .await
        .expect("missing TRC must not error");
    assert_eq!(missing, None);
    let missing_max = db
        .get_trc_max_version(&ctx, Isd(2))
        .await
        .expect("missing max TRC must not error");
    assert_eq!(missing_max, None);
}

/// `get_all_trcs` is empty on a fresh store and returns entries in
/// insertion order afterwards.
pub async fn get_all_trcs_scenario(db: &impl TrustDb) {
    let ctx = OpCtx::background();
    assert!(db.get_all_trcs(&ctx).await.expect("empty get_all").is_empty());

    let first = fixtures::trc(1, 1);
    db.insert_trc(&ctx, &first).await.expect("insert first");
    assert_eq!(db.get_all_trcs(&ctx).await.expect("get_all"), vec![first.clone()]);

    let second = fixtures::trc(2, 1);
    db.insert_trc(&ctx, &second).await.expect("insert second");
    assert_eq!(db.get_all_trcs(&ctx).await.expect("get_all"), vec![first, second]);
}

/// Issuer-certificate insert/read scenario, including absent IAs.
pub async fn issuer_cert_scenario(db: &impl TrustDb) {
    let ctx = OpCtx::background();
    let cert = fixtures::issuer_cert("1-ff00:0:310", 1);
    let ia: IsdAs = "1-ff00:0:310".parse().unwrap();

    assert!(db.insert_issuer_cert(&ctx, &cert).await.expect("insert") > 0);
    assert_eq!(db.insert_issuer_cert(&ctx, &cert).await.expect("re-insert"), 0);

    let read = db
        .get_issuer_cert_version(&ctx, ia, Version::At(1))
        .await
        .expect("get version");
    assert_eq!(read.as_ref(), Some(&cert));
    let max = db
        .get_issuer_cert_max_version(&ctx, ia)
        .await
        .expect("get max");
    assert_eq!(max.as_ref(), Some(&cert));
    let latest = db
        .get_issuer_cert_version(&ctx, ia, Version::Latest)
        .await
        .expect("get latest");
    assert_eq!(latest, max);

    let other: IsdAs = "1-ff00:0:320".parse().unwrap();
    assert_eq!(
        db.get_issuer_cert_version(&ctx, other, Version::At(10))
            .await
            .expect("absent IA"),
        None
    );
    assert_eq!(
        db.get_issuer_cert_max_version(&ctx, other)
            .await
            .expect("absent IA max"),
        None
    );
}

/// Leaf-certificate insert/read scenario, including absent IAs.
pub async fn leaf_cert_scenario(db: &impl TrustDb) {
    let ctx = OpCtx::background();
    let cert = fixtures::leaf_cert("1-ff00:0:311", 1);
    let ia: IsdAs = "1-ff00:0:311".parse().unwrap();

    assert!(db.insert_leaf_cert(&ctx, &cert).await.expect("insert") > 0);
    assert_eq!(db.insert_leaf_cert(&ctx, &cert).await.expect("re-insert"), 0);

    let read = db
        .get_leaf_cert_version(&ctx, ia, Version::At(1))
        .await
        .expect("get version");
    assert_eq!(read.as_ref(), Some(&cert));
    let max = db.get_leaf_cert_max_version(&ctx, ia).await.expect("get max");
    assert_eq!(max.as_ref(), Some(&cert));
    let latest = db
        .get_leaf_cert_version(&ctx, ia, Version::Latest)
        .await
        .expect("get latest");
    assert_eq!(latest, max);

    let other: IsdAs = "1-ff00:0:321".parse().unwrap();
    assert_eq!(
        db.get_leaf_cert_version(&ctx, other, Version::Latest)
            .await
            .expect("absent IA"),
        None
    );
}

/// The issuer and leaf roles occupy unrelated tables: the same IA and
/// version in both roles are independent records.
pub async fn cert_roles_are_independent(db: &impl TrustDb) {
    let ctx = OpCtx::background();
    let ia: IsdAs = "1-ff00:0:311".parse().unwrap();
    let issuer = fixtures::issuer_cert("1-ff00:0:311", 3);
    db.insert_issuer_cert(&ctx, &issuer).await.expect("insert issuer");

    // No leaf certificate exists for the IA, at version 3 or at all.
    assert_eq!(
        db.get_leaf_cert_version(&ctx, ia, Version::At(3))
            .await
            .expect("leaf at 3"),
        None
    );
    assert_eq!(
        db.get_leaf_cert_max_version(&ctx, ia).await.expect("leaf max"),
        None
    );

    let leaf = fixtures::leaf_cert("1-ff00:0:311", 3);
    db.insert_leaf_cert(&ctx, &leaf).await.expect("insert leaf");

    // Both roles now hold version 3 for the IA, and they stay distinct.
    let got_issuer = db
        .get_issuer_cert_version(&ctx, ia, Version::At(3))
        .await
        .expect("issuer at 3");
    let got_leaf = db
        .get_leaf_cert_version(&ctx, ia, Version::At(3))
        .await
        .expect("leaf at 3");
    assert_eq!(got_issuer, Some(issuer));
    assert_eq!(got_leaf, Some(leaf));
}

/// Insert a chain, read it back whole at its exact version, max version,
/// and the latest sentinel; a foreign IA stays absent.
pub async fn chain_scenario(db: &impl TrustDb) {
    let ctx = OpCtx::background();
    let chain = fixtures::chain("1-ff00:0:311", 1);
    let ia = chain.ia();

    let affected = db.insert_chain(&ctx, &chain).await.expect("insert");
    assert!(affected > 0);
    let affected = db.insert_chain(&ctx, &chain).await.expect("re-insert");
    assert_eq!(affected, 0, "identical chain re-insert must be a no-op");

    let read = db
        .get_chain_version(&ctx, ia, Version::At(1))
        .await
        .expect("get version");
    assert_eq!(read.as_ref(), Some(&chain));

    let max = db.get_chain_max_version(&ctx, ia).await.expect("get max");
    assert_eq!(max.as_ref(), Some(&chain));
    let latest = db
        .get_chain_version(&ctx, ia, Version::Latest)
        .await
        .expect("get latest");
    assert_eq!(latest, max);

    let other: IsdAs = "1-ff00:0:320".parse().unwrap();
    assert_eq!(
        db.get_chain_version(&ctx, other, Version::At(10))
            .await
            .expect("absent chain"),
        None
    );
    assert_eq!(
        db.get_chain_version(&ctx, other, Version::Latest)
            .await
            .expect("absent chain latest"),
        None
    );
    assert_eq!(
        db.get_chain_max_version(&ctx, other)
            .await
            .expect("absent chain max"),
        None
    );
}

/// The two halves of an inserted chain are individually visible in their
/// certificate tables (atomicity: both or neither).
pub async fn chain_halves_are_visible(db: &impl TrustDb) {
    let ctx = OpCtx::background();
    let chain = fixtures::chain("1-ff00:0:311", 1);
    db.insert_chain(&ctx, &chain).await.expect("insert");

    let issuer = db
        .get_issuer_cert_version(&ctx, chain.issuer.0.subject, Version::At(chain.issuer.0.version))
        .await
        .expect("issuer half");
    assert_eq!(issuer.as_ref(), Some(&chain.issuer));

    let leaf = db
        .get_leaf_cert_version(&ctx, chain.ia(), Version::At(chain.version()))
        .await
        .expect("leaf half");
    assert_eq!(leaf.as_ref(), Some(&chain.leaf));
}

/// `get_all_chains` is empty on a fresh store and returns one chain per
/// leaf in insertion order afterwards.
pub async fn get_all_chains_scenario(db: &impl TrustDb) {
    let ctx = OpCtx::background();
    assert!(db.get_all_chains(&ctx).await.expect("empty get_all").is_empty());

    let first = fixtures::chain("1-ff00:0:311", 1);
    db.insert_chain(&ctx, &first).await.expect("insert first");
    assert_eq!(db.get_all_chains(&ctx).await.expect("get_all"), vec![first.clone()]);

    let second = fixtures::chain("2-ff00:0:212", 1);
    db.insert_chain(&ctx, &second).await.expect("insert second");
    assert_eq!(
        db.get_all_chains(&ctx).await.expect("get_all"),
        vec![first, second]
    );
}

/// A malformed chain (halves that do not reference each other) is rejected
/// with no partial write.
pub async fn malformed_chain_leaves_no_partial_state(db: &impl TrustDb) {
    let ctx = OpCtx::background();
    let mut chain = fixtures::chain("1-ff00:0:311", 1);
    chain.leaf.0.issuer_version = chain.issuer.0.version + 1;

    let err = db.insert_chain(&ctx, &chain).await.expect_err("must reject");
    assert!(matches!(err, TrustDbError::Malformed(_)), "got {err:?}");

    assert_eq!(
        db.get_issuer_cert_max_version(&ctx, chain.issuer.0.subject)
            .await
            .expect("issuer table untouched"),
        None
    );
    assert_eq!(
        db.get_leaf_cert_max_version(&ctx, chain.ia())
            .await
            .expect("leaf table untouched"),
        None
    );
}
