// Bridge contract binding shared by event decoding and submission

use ethers::prelude::abigen;

abigen!(
    DepositBridge,
    r#"[
        event Deposited(bytes32 indexed resourceId, address indexed user, uint256 amount, uint64 destChainId)
        function executeTx(bytes32 originalTxHash, bytes32 resourceId, address user, uint256 amount) external
    ]"#
);
