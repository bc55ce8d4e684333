//! TFT token contract ABI definitions
//!
//! Only the functions and events the bridge client touches. Owner and signer
//! management stay with the contract's own tooling.

use alloy::sol;

sol! {
    /// TFT token contract interface (ERC20 + bridge withdraw/mint)
    #[derive(Debug)]
    #[sol(rpc)]
    contract TFT {
        // ========================================================================
        // ERC20 views
        // ========================================================================

        function balanceOf(address account) external view returns (uint256);

        function decimals() external view returns (uint8);

        function symbol() external view returns (string memory);

        // ========================================================================
        // Bridge
        // ========================================================================

        /// Burn `amount` and request a payout to `blockchain_address` on `network`
        function withdraw(uint256 amount, string calldata blockchain_address, string calldata network) external;

        // ========================================================================
        // Events
        // ========================================================================

        /// Emitted on withdraw; watched by the bridge to pay out on Stellar
        event Withdraw(address indexed receiver, uint256 tokens, string blockchain_address, string network);
    }
}
