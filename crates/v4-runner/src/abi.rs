use ethers::prelude::abigen;

abigen!(
    UniversalRouter,
    r#"[
        function execute(bytes commands, bytes[] inputs, uint256 deadline) external payable
    ]"#,
);

abigen!(
    PythMinter,
    r#"[
        function mint() external payable
        function updateAndMint(bytes[] pythPriceUpdate) external payable
    ]"#,
);

abigen!(
    Erc20,
    r#"[
        function approve(address spender, uint256 amount) external returns (bool)
        function allowance(address owner, address spender) external view returns (uint256)
        function balanceOf(address account) external view returns (uint256)
    ]"#,
);
