use alloy_sol_types::sol;

sol! {
    #[derive(Debug, Default, PartialEq, Eq)]
    struct PoolKey {
        address currency0;
        address currency1;
        uint24 fee;
        int24 tickSpacing;
        address hooks;
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct SwapParams {
        bool zeroForOne;
        int256 amountSpecified;
        uint160 sqrtPriceLimitX96;
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct ModifyLiquidityParams {
        int24 tickLower;
        int24 tickUpper;
        int256 liquidityDelta;
        bytes32 salt;
    }

    /// Constructor arguments of the hook wrapper, appended to its creation code.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct WrapperConstructorArgs {
        address poolManager;
        address implementation;
        uint16 forwardedCallbacks;
        uint16 forwardedDeltas;
    }

    interface IHooks {
        function beforeInitialize(address sender, PoolKey key, uint160 sqrtPriceX96) external returns (bytes4);
        function afterInitialize(address sender, PoolKey key, uint160 sqrtPriceX96, int24 tick) external returns (bytes4);
        function beforeAddLiquidity(address sender, PoolKey key, ModifyLiquidityParams params, bytes hookData) external returns (bytes4);
        function afterAddLiquidity(address sender, PoolKey key, ModifyLiquidityParams params, int256 delta, int256 feesAccrued, bytes hookData) external returns (bytes4, int256);
        function beforeRemoveLiquidity(address sender, PoolKey key, ModifyLiquidityParams params, bytes hookData) external returns (bytes4);
        function afterRemoveLiquidity(address sender, PoolKey key, ModifyLiquidityParams params, int256 delta, int256 feesAccrued, bytes hookData) external returns (bytes4, int256);
        function beforeSwap(address sender, PoolKey key, SwapParams params, bytes hookData) external returns (bytes4, int256, uint24);
        function afterSwap(address sender, PoolKey key, SwapParams params, int256 delta, bytes hookData) external returns (bytes4, int128);
        function beforeDonate(address sender, PoolKey key, uint256 amount0, uint256 amount1, bytes hookData) external returns (bytes4);
        function afterDonate(address sender, PoolKey key, uint256 amount0, uint256 amount1, bytes hookData) external returns (bytes4);
    }

    // Error types
    #[derive(Debug, PartialEq, Eq)]
    error HookAddressNotValid(address hooks);

    #[derive(Debug, PartialEq, Eq)]
    error HookPermissionForbidden(address hooks);

    #[derive(Debug, PartialEq, Eq)]
    error HookNotImplemented();

    #[derive(Debug, PartialEq, Eq)]
    error InvalidHookResponse();

    #[derive(Debug, PartialEq, Eq)]
    error CurrencyNotSettled();

    #[derive(Debug, PartialEq, Eq)]
    error ZeroForOneSwapAlreadyExecuted();

    #[derive(Debug, PartialEq, Eq)]
    error OneForZeroSwapAlreadyExecuted();

    #[derive(Debug, PartialEq, Eq)]
    error Unauthorized();
}
