// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Contract interfaces of the staking network.
//!
//! Only the events the indexer consumes and the read-only calls it needs are
//! declared here.

alloy::sol! {
    #[sol(rpc)]
    interface IEraManager {
        event NewEraStart(uint256 indexed era, address caller);
        event EraPeriodUpdate(uint256 indexed era, uint256 eraPeriod);

        function eraNumber() external view returns (uint256);
        function eraPeriod() external view returns (uint256);
    }
}

alloy::sol! {
    #[sol(rpc)]
    interface IIndexerRegistry {
        event RegisterIndexer(address indexed indexer, uint256 amount, bytes32 metadata);
        event UnregisterIndexer(address indexed indexer);
        event SetCommissionRate(address indexed indexer, uint256 amount);
        event SetMinimumStakingAmount(uint256 amount);

        function minimumStakingAmount() external view returns (uint256);
    }
}

alloy::sol! {
    #[sol(rpc)]
    interface IStaking {
        event DelegationAdded(address indexed source, address indexed runner, uint256 amount);
        event DelegationRemoved(address indexed source, address indexed runner, uint256 amount);
        event UnbondRequested(address indexed source, address indexed runner, uint256 amount, uint256 index, uint8 unbondType);
        event UnbondWithdrawn(address indexed source, uint256 amount, uint256 fee, uint256 index);
        event UnbondCancelled(address indexed source, address indexed runner, uint256 amount, uint256 index);
        event SetIndexerLeverageLimit(uint256 amount);

        function indexerLeverageLimit() external view returns (uint256);
    }
}

alloy::sol! {
    #[sol(rpc)]
    interface IRewardsDistributor {
        event DistributeRewards(address indexed runner, uint256 indexed eraIdx, uint256 rewards, uint256 commission);
        event ClaimRewards(address indexed runner, address indexed delegator, uint256 rewards);
    }
}

alloy::sol! {
    #[sol(rpc)]
    interface IRewardsBooster {
        event DeploymentBoosterAdded(bytes32 indexed deploymentId, address indexed account, uint256 amount);
        event DeploymentBoosterRemoved(bytes32 indexed deploymentId, address indexed account, uint256 amount);
        event AllocationRewardsGiven(bytes32 indexed deploymentId, address indexed runner, uint256 amount);
        event QueryRewardsSpent(bytes32 indexed deploymentId, address indexed runner, uint256 amount, bytes data);
    }
}
