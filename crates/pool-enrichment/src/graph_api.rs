//! [`PoolIndex`] implementation backed by the Balancer V2 subgraph.

use {
    crate::{
        address::Checksummed,
        model::{LinearPool, PoolId, PoolToken, PoolType},
        pool_index::PoolIndex,
        subgraph::SubgraphClient,
    },
    alloy_primitives::Address,
    anyhow::Result,
    bigdecimal::BigDecimal,
    number::serialization::DecimalString,
    reqwest::{Client, Url},
    serde::Deserialize,
    serde_with::serde_as,
};

/// Upper bound of pools returned for a single lookup. A pool never holds
/// more tokens than this.
const QUERY_PAGE_SIZE: usize = 1000;

/// A client to the Balancer V2 subgraph.
///
/// This client is not implemented to allow general GraphQL queries, but
/// implements the lookups the enrichment needs.
pub struct BalancerSubgraphClient(SubgraphClient);

impl BalancerSubgraphClient {
    pub fn new(subgraph_url: Url, client: Client) -> Result<Self> {
        Ok(Self(SubgraphClient::try_new(subgraph_url, client)?))
    }
}

#[async_trait::async_trait]
impl PoolIndex for BalancerSubgraphClient {
    async fn linear_pools(
        &self,
        addresses: &[Address],
        total_shares_gt: i64,
    ) -> Result<Vec<LinearPool>> {
        use self::linear_pools_query::*;

        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let addresses = addresses
            .iter()
            .map(|address| format!("{address:#x}"))
            .collect::<Vec<_>>();
        let pools = self
            .0
            .query::<Data>(
                QUERY,
                Some(json_map! {
                    "addresses" => addresses,
                    "totalSharesGt" => total_shares_gt.to_string(),
                    "pageSize" => QUERY_PAGE_SIZE,
                }),
            )
            .await?
            .pools;

        Ok(pools.into_iter().filter_map(PoolData::into_linear).collect())
    }
}

/// Pool data as returned by the subgraph. The linear pool indices are only
/// set for linear pools.
#[serde_as]
#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct PoolData {
    id: PoolId,
    #[serde_as(as = "Checksummed")]
    address: Address,
    pool_type: PoolType,
    #[serde_as(as = "DecimalString")]
    total_shares: BigDecimal,
    main_index: Option<usize>,
    wrapped_index: Option<usize>,
    tokens: Vec<PoolToken>,
}

impl PoolData {
    fn into_linear(self) -> Option<LinearPool> {
        let (Some(main_index), Some(wrapped_index)) = (self.main_index, self.wrapped_index) else {
            tracing::debug!(pool = %self.address, pool_type = %self.pool_type, "not a linear pool");
            return None;
        };
        Some(LinearPool {
            id: self.id,
            address: self.address,
            pool_type: self.pool_type,
            main_index,
            wrapped_index,
            tokens: self.tokens,
            total_shares: self.total_shares,
        })
    }
}

mod linear_pools_query {
    use {super::PoolData, serde::Deserialize};

    pub const QUERY: &str = r#"
        query LinearPools($addresses: [Bytes!], $totalSharesGt: BigDecimal, $pageSize: Int) {
            pools(
                first: $pageSize
                where: {
                    address_in: $addresses
                    totalShares_gt: $totalSharesGt
                }
            ) {
                id
                address
                poolType
                totalShares
                mainIndex
                wrappedIndex
                tokens {
                    address
                    balance
                    weight
                    decimals
                    symbol
                }
            }
        }
    "#;

    #[derive(Debug, Deserialize, PartialEq)]
    pub struct Data {
        pub pools: Vec<PoolData>,
    }
}
