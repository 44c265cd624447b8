use async_trait::async_trait;

use tfab_types::{Chain, Isd, IsdAs, IssuerCert, LeafCert, Trc, Version, Versioned};

use crate::ctx::OpCtx;
use crate::error::TrustDbResult;

/// Engine interface over one versioned object family.
///
/// All implementations must satisfy these invariants:
/// - Inserts are idempotent: an existing `(owner, version)` key yields an
///   affected count of 0 and no error.
/// - A successful insert is immediately visible to subsequent reads.
/// - Absence is `Ok(None)` / an empty vector, never an error.
/// - `get_max_version` is exactly `get_version` with [`Version::Latest`],
///   and latest resolution never observes a version whose payload is not
///   yet readable.
/// - `get_all` returns objects in global insertion order.
/// - A fired [`OpCtx`] surfaces as an error distinct from absence, and a
///   cancelled write does not partially commit.
///
/// The contract test suite in [`crate::contract`] is written once against
/// this trait; every backend should run it.
#[async_trait]
pub trait VersionedStore<T: Versioned>: Send + Sync {
    /// Insert an object under the `(owner, version)` it derives from its
    /// own payload. Returns the number of rows written (0 or 1).
    async fn insert(&self, ctx: &OpCtx, object: &T) -> TrustDbResult<u64>;

    /// Fetch the object at `(owner, version)`, resolving
    /// [`Version::Latest`] first.
    async fn get_version(
        &self,
        ctx: &OpCtx,
        owner: T::Owner,
        version: Version,
    ) -> TrustDbResult<Option<T>>;

    /// Fetch the owner's highest stored version.
    async fn get_max_version(&self, ctx: &OpCtx, owner: T::Owner) -> TrustDbResult<Option<T>> {
        self.get_version(ctx, owner, Version::Latest).await
    }

    /// Every stored object across all owners, in insertion order.
    async fn get_all(&self, ctx: &OpCtx) -> TrustDbResult<Vec<T>>;
}

/// The full trust database surface consumed by RPC handlers, the crypto
/// syncer, and bootstrap code.
///
/// TRCs are keyed by ISD; issuer and leaf certificates are keyed by IA in
/// two unrelated tables. A chain has no table of its own: inserting one
/// persists its two certificate halves atomically, and reads reconstruct it
/// from the leaf's recorded issuer reference.
#[async_trait]
pub trait TrustDb: Send + Sync {
    async fn insert_trc(&self, ctx: &OpCtx, trc: &Trc) -> TrustDbResult<u64>;
    async fn get_trc_version(
        &self,
        ctx: &OpCtx,
        isd: Isd,
        version: Version,
    ) -> TrustDbResult<Option<Trc>>;
    async fn get_trc_max_version(&self, ctx: &OpCtx, isd: Isd) -> TrustDbResult<Option<Trc>>;
    async fn get_all_trcs(&self, ctx: &OpCtx) -> TrustDbResult<Vec<Trc>>;

    async fn insert_issuer_cert(&self, ctx: &OpCtx, cert: &IssuerCert) -> TrustDbResult<u64>;
    async fn get_issuer_cert_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
        version: Version,
    ) -> TrustDbResult<Option<IssuerCert>>;
    async fn get_issuer_cert_max_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
    ) -> TrustDbResult<Option<IssuerCert>>;

    async fn insert_leaf_cert(&self, ctx: &OpCtx, cert: &LeafCert) -> TrustDbResult<u64>;
    async fn get_leaf_cert_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
        version: Version,
    ) -> TrustDbResult<Option<LeafCert>>;
    async fn get_leaf_cert_max_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
    ) -> TrustDbResult<Option<LeafCert>>;

    /// Persist both halves of the chain in one atomic unit. The affected
    /// count sums the two sub-inserts, so re-inserting an identical chain
    /// yields 0.
    async fn insert_chain(&self, ctx: &OpCtx, chain: &Chain) -> TrustDbResult<u64>;

    /// Reconstruct the chain whose leaf is stored at `(ia, version)`.
    /// [`Version::Latest`] resolves in the leaf's version space; an absent
    /// leaf makes the whole chain absent.
    async fn get_chain_version(
        &self,
        ctx: &OpCtx,
        ia: IsdAs,
        version: Version,
    ) -> TrustDbResult<Option<Chain>>;
    async fn get_chain_max_version(&self, ctx: &OpCtx, ia: IsdAs) -> TrustDbResult<Option<Chain>>;

    /// One chain per stored leaf certificate, in leaf insertion order.
    async fn get_all_chains(&self, ctx: &OpCtx) -> TrustDbResult<Vec<Chain>>;
}
