use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use tfab_types::{Chain, Isd, IsdAs, IssuerCert, LeafCert, Trc, Version};

use crate::ctx::OpCtx;
use crate::error::{TrustDbError, TrustDbResult};
use crate::table::VersionedTable;
use crate::traits::{TrustDb, VersionedStore};

/// In-memory trust database for tests, local demos, and embedding.
///
/// All three object-family tables live behind a single `RwLock`, so latest
/// resolution is transactional with respect to concurrent inserts and a
/// chain insert commits both certificate halves in one critical section.
/// No lock is held across an await point.
pub struct InMemoryTrustDb {
    inner: RwLock<TrustState>,
}

#[derive(Default)]
struct TrustState {
    trcs: VersionedTable<Trc>,
    issuer_certs: VersionedTable<IssuerCert>,
    leaf_certs: VersionedTable<LeafCert>,
}

impl InMemoryTrustDb {
    /// Create a new empty trust database.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(TrustState::default()),
        }
    }

    fn read(&self) -> TrustDbResult<RwLockReadGuard<'_, TrustState>> {
        self.inner
            .read()
            .map_err(|_| TrustDbError::Backend("trust state lock poisoned".into()))
    }

    fn write(&self) -> TrustDbResult<RwLockWriteGuard<'_, TrustState>> {
        self.inner
            .write()
            .map_err(|_| TrustDbError::Backend("trust state lock poisoned".into()))
    }
}

impl Default for InMemoryTrustDb {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryTrustDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.read() {
            Ok(state) => f
                .debug_struct("InMemoryTrustDb")
                .field("trcs", &state.trcs.len())
                .field("issuer_certs", &state.issuer_certs.len())
                .field("leaf_certs", &state.leaf_certs.len())
                .finish(),
            Err(_) => f.write_str("InMemoryTrustDb(poisoned)"),
        }
    }
}

/// Pair a stored leaf with its recorded issuer half.
///
/// Chain inserts make a missing issuer unreachable; if a read observes one
/// anyway the store surfaces it rather than fabricating a partial chain.
fn chain_for_leaf(state: &TrustState, leaf: &LeafCert) -> TrustDbResult<Chain> {
    let issuer_ia = leaf.0.issuer;
    let issuer_version = leaf.0.issuer_version;
    match state.issuer_certs.get(&issuer_ia, Version::At(issuer_version)) {
        Some(issuer) => Ok(Chain {
            issuer: issuer.clone(),
            leaf: leaf.clone(),
        }),
        None => Err(TrustDbError::Inconsistent {
            ia: leaf.0.subject,
            version: leaf.0.version,
            issuer: issuer_ia,
            issuer_version,
        }),
    }
}

#[async_trait]
impl VersionedStore<Trc> for InMemoryTrustDb {
    async fn insert(&self, ctx: &OpCtx, trc: &Trc) -> TrustDbResult<u64> {
        ctx.check()?;
        trc.validate()?;
        let mut state = self.write()?;
        ctx.check()?;
        Ok(state.trcs.insert(trc))
    }

    async fn get_version(
        &self,
        ctx: &OpCtx,
        isd: Isd,
        version: Version,
    ) -> TrustDbResult<Option<Trc>> {
        ctx.check()?;
        let state = self.read()?;
        Ok(state.trcs.get(&isd, version).cloned())
    }

    async fn get_all(&self, ctx: &OpCtx) -> TrustDbResult<Vec<Trc>> {
        ctx.check()?;
        let state = self.read()?;
        Ok(state.trcs.get_all().cloned().collect())
    }
}

#[async_trait]
impl VersionedStore<IssuerCert> for InMemoryTrustDb {
    async fn insert(&self, ctx: &OpCtx, cert: &IssuerCert) -> TrustDbResult<u64> {
        ctx.check()?;
        cert.0.validate()?;
        let mut state = self.write()?;
        ctx.check()?;
        Ok(state.issuer_certs.insert(cert))
    }

    async fn get_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
        version: Version,
    ) -> TrustDbResult<Option<IssuerCert>> {
        ctx.check()?;
        let state = self.read()?;
        Ok(state.issuer_certs.get(&ia, version).cloned())
    }

    async fn get_all(&self, ctx: &OpCtx) -> TrustDbResult<Vec<IssuerCert>> {
        ctx.check()?;
        let state = self.read()?;
        Ok(state.issuer_certs.get_all().cloned().collect())
    }
}

#[async_trait]
impl VersionedStore<LeafCert> for InMemoryTrustDb {
    async fn insert(&self, ctx: &OpCtx, cert: &LeafCert) -> TrustDbResult<u64> {
        ctx.check()?;
        cert.0.validate()?;
        let mut state = self.write()?;
        ctx.check()?;
        Ok(state.leaf_certs.insert(cert))
    }

    async fn get_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
        version: Version,
    ) -> TrustDbResult<Option<LeafCert>> {
        ctx.check()?;
        let state = self.read()?;
        Ok(state.leaf_certs.get(&ia, version).cloned())
    }

    async fn get_all(&self, ctx: &OpCtx) -> TrustDbResult<Vec<LeafCert>> {
        ctx.check()?;
        let state = self.read()?;
        Ok(state.leaf_certs.get_all().cloned().collect())
    }
}

#[async_trait]
impl TrustDb for InMemoryTrustDb {
    async fn insert_trc(&self, ctx: &OpCtx, trc: &Trc) -> TrustDbResult<u64> {
        VersionedStore::<Trc>::insert(self, ctx, trc).await
    }

    async fn get_trc_version(
        &self,
        ctx: &OpCtx,
        isd: Isd,
        version: Version,
    ) -> TrustDbResult<Option<Trc>> {
        VersionedStore::<Trc>::get_version(self, ctx, isd, version).await
    }

    async fn get_trc_max_version(&self, ctx: &OpCtx, isd: Isd) -> TrustDbResult<Option<Trc>> {
        VersionedStore::<Trc>::get_max_version(self, ctx, isd).await
    }

    async fn get_all_trcs(&self, ctx: &OpCtx) -> TrustDbResult<Vec<Trc>> {
        VersionedStore::<Trc>::get_all(self, ctx).await
    }

    async fn insert_issuer_cert(&self, ctx: &OpCtx, cert: &IssuerCert) -> TrustDbResult<u64> {
        VersionedStore::<IssuerCert>::insert(self, ctx, cert).await
    }

    async fn get_issuer_cert_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
        version: Version,
    ) -> TrustDbResult<Option<IssuerCert>> {
        VersionedStore::<IssuerCert>::get_version(self, ctx, ia, version).await
    }

    async fn get_issuer_cert_max_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
    ) -> TrustDbResult<Option<IssuerCert>> {
        VersionedStore::<IssuerCert>::get_max_version(self, ctx, ia).await
    }

    async fn insert_leaf_cert(&self, ctx: &OpCtx, cert: &LeafCert) -> TrustDbResult<u64> {
        VersionedStore::<LeafCert>::insert(self, ctx, cert).await
    }

    async fn get_leaf_cert_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
        version: Version,
    ) -> TrustDbResult<Option<LeafCert>> {
        VersionedStore::<LeafCert>::get_version(self, ctx, ia, version).await
    }

    async fn get_leaf_cert_max_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
    ) -> TrustDbResult<Option<LeafCert>> {
        VersionedStore::<LeafCert>::get_max_version(self, ctx, ia).await
    }

    async fn insert_chain(&self, ctx: &OpCtx, chain: &Chain) -> TrustDbResult<u64> {
        ctx.check()?;
        // Validate both halves before touching any table, so a malformed
        // chain leaves no partial state.
        chain.validate()?;
        let mut state = self.write()?;
        ctx.check()?;
        let affected = state.issuer_certs.insert(&chain.issuer) + state.leaf_certs.insert(&chain.leaf);
        Ok(affected)
    }

    async fn get_chain_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
        version: Version,
    ) -> TrustDbResult<Option<Chain>> {
        ctx.check()?;
        let state = self.read()?;
        match state.leaf_certs.get(&ia, version) {
            Some(leaf) => chain_for_leaf(&state, leaf).map(Some),
            None => Ok(None),
        }
    }

    async fn get_chain_max_version(&self, ctx: &OpCtx, ia: IsdAs) -> TrustDbResult<Option<Chain>> {
        self.get_chain_version(ctx, ia, Version::Latest).await
    }

    async fn get_all_chains(&self, ctx: &OpCtx) -> TrustDbResult<Vec<Chain>> {
        ctx.check()?;
        let state = self.read()?;
        state
            .leaf_certs
            .get_all()
            .map(|leaf| chain_for_leaf(&state, leaf))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tfab_types::{Certificate, Validity};

    use super::*;

    fn trc(isd: u16, version: u64) -> Trc {
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

    fn cert(subject: &str, version: u64, issuer: &str, issuer_version: u64) -> Certificate {
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

    fn chain(ia: &str, version: u64) -> Chain {
        Chain {
            issuer: IssuerCert(cert("1-ff00:0:310", 1, "1-ff00:0:310", 1)),
            leaf: LeafCert(cert(ia, version, "1-ff00:0:310", 1)),
        }
    }

    #[tokio::test]
    async fn cancelled_write_does_not_commit() {
        let db = InMemoryTrustDb::new();
        let ctx = OpCtx::with_cancel(tokio_util::sync::CancellationToken::new());
        ctx.cancel_token().cancel();

        let err = db.insert_trc(&ctx, &trc(1, 1)).await.unwrap_err();
        assert!(matches!(err, TrustDbError::Cancelled));

        let trcs = db.get_all_trcs(&OpCtx::background()).await.unwrap();
        assert!(trcs.is_empty());
    }

    #[tokio::test]
    async fn malformed_trc_rejected_before_storage() {
        let db = InMemoryTrustDb::new();
        let ctx = OpCtx::background();
        let mut bad = trc(1, 1);
        bad.version = 0;

        let err = db.insert_trc(&ctx, &bad).await.unwrap_err();
        assert!(matches!(err, TrustDbError::Malformed(_)));
        assert!(db.get_all_trcs(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn leaf_without_issuer_surfaces_inconsistency() {
        let db = InMemoryTrustDb::new();
        let ctx = OpCtx::background();
        // Bypass insert_chain to plant a leaf whose issuer half is absent.
        let leaf = LeafCert(cert("1-ff00:0:311", 1, "1-ff00:0:310", 1));
        db.insert_leaf_cert(&ctx, &leaf).await.unwrap();

        let ia = "1-ff00:0:311".parse().unwrap();
        let err = db.get_chain_version(&ctx, ia, Version::At(1)).await.unwrap_err();
        assert!(matches!(err, TrustDbError::Inconsistent { .. }));
    }

    #[tokio::test]
    async fn chain_insert_counts_only_new_rows() {
        let db = InMemoryTrustDb::new();
        let ctx = OpCtx::background();
        let chain = chain("1-ff00:0:311", 1);

        // Issuer half already present: only the leaf row is new.
        db.insert_issuer_cert(&ctx, &chain.issuer).await.unwrap();
        assert_eq!(db.insert_chain(&ctx, &chain).await.unwrap(), 1);
        assert_eq!(db.insert_chain(&ctx, &chain).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn two_chains_may_share_an_issuer() {
        let db = InMemoryTrustDb::new();
        let ctx = OpCtx::background();
        let first = chain("1-ff00:0:311", 1);
        let second = chain("1-ff00:0:312", 1);

        assert_eq!(db.insert_chain(&ctx, &first).await.unwrap(), 2);
        // Shared issuer half dedups; only the second leaf is new.
        assert_eq!(db.insert_chain(&ctx, &second).await.unwrap(), 1);

        let all = db.get_all_chains(&ctx).await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn racing_duplicate_inserts_write_exactly_once() {
        let db = Arc::new(InMemoryTrustDb::new());
        let object = trc(1, 1);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = Arc::clone(&db);
            let object = object.clone();
            handles.push(tokio::spawn(async move {
                db.insert_trc(&OpCtx::background(), &object).await.unwrap()
            }));
        }

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }
        assert_eq!(total, 1);
        assert_eq!(
            db.get_all_trcs(&OpCtx::background()).await.unwrap(),
            vec![object]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn latest_never_resolves_ahead_of_its_payload() {
        let db = Arc::new(InMemoryTrustDb::new());

        let writer = {
            let db = Arc::clone(&db);
            tokio::spawn(async move {
                for version in 1..=20 {
                    db.insert_trc(&OpCtx::background(), &trc(1, version))
                        .await
                        .unwrap();
                }
            })
        };

        let reader = {
            let db = Arc::clone(&db);
            tokio::spawn(async move {
                let ctx = OpCtx::background();
                loop {
                    if let Some(latest) = db.get_trc_max_version(&ctx, Isd(1)).await.unwrap() {
                        // Any version visible through latest resolution must
                        // be readable directly.
                        let direct = db
                            .get_trc_version(&ctx, Isd(1), Version::At(latest.version))
                            .await
                            .unwrap();
                        assert_eq!(direct, Some(latest.clone()));
                        if latest.version == 20 {
                            break;
                        }
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
    }
}
